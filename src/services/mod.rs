// ============================================================================
// SERVICES - LOGIQUE MÉTIER DU MOTEUR
// ============================================================================
//
// Liste des modules:
//   - geo_service : distance haversine + rectangle englobant (fonctions pures)
//   - search_service : composition des filtres de recherche et pagination
//   - capacity_ledger : compteur atomique de places par mission
//   - cancellation_policy : plafond d'annulations par couple (mission, bénévole)
//   - registration_service : machine à états des inscriptions (orchestrateur)
//
// ============================================================================

pub mod geo_service;
pub mod search_service;
pub mod capacity_ledger;
pub mod cancellation_policy;
pub mod registration_service;
