// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - mission : Missions publiées par les organisations (capacité finie)
//   - registration : Inscriptions bénévole <-> mission (machine à états)
//   - mission_skill : Compétences requises par mission (table de jointure)
//   - dto : Data Transfer Objects (filtres de recherche, réponses API)
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - mission.active_count est le registre de capacité: il n'est modifié
//     que par le Capacity Ledger (UPDATE conditionnel), jamais directement
//   - Une seule ligne registration par couple (mission_id, user_id)
//
// ============================================================================

pub mod health;
pub mod mission;
pub mod registration;
pub mod mission_skill;
pub mod dto;
