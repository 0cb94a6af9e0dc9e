use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Statut d'une inscription pour un couple (mission, bénévole).
/// Transitions autorisées:
///   inscrit  -> confirme (l'organisation confirme)
///   inscrit  -> annule   (le bénévole annule)
///   confirme -> annule   (le bénévole annule)
///   confirme -> termine  (fin de mission, déclencheur externe)
///   annule   -> inscrit  (ré-inscription explicite, si la politique l'autorise)
/// `termine` est terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[sea_orm(string_value = "inscrit")]
    Inscrit,
    #[sea_orm(string_value = "confirme")]
    Confirme,
    #[sea_orm(string_value = "termine")]
    Termine,
    #[sea_orm(string_value = "annule")]
    Annule,
}

impl RegistrationStatus {
    /// Une inscription active compte dans la capacité de la mission.
    pub fn is_active(&self) -> bool {
        !matches!(self, RegistrationStatus::Annule)
    }
}

// Une seule ligne par couple (mission_id, user_id): la ré-inscription après
// annulation réutilise la ligne (retour à `inscrit`) au lieu d'en créer une
// nouvelle. cancellation_count reste donc monotone sur la ligne elle-même.
//
// Le schéma porte un index unique sur (mission_id, user_id)
// (uq_registration_mission_user): deux `register` concurrents pour le même
// couple ne peuvent pas insérer deux lignes, le perdant reçoit une violation
// d'unicité que le service traduit en AlreadyRegistered.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub mission_id: i32,
    /// Identifiant fourni par le fournisseur d'identité (externe au moteur)
    pub user_id: i32,
    pub status: RegistrationStatus,
    pub registration_date: DateTime,
    pub confirmation_date: Option<DateTime>,
    pub cancellation_date: Option<DateTime>,
    pub cancellation_reason: Option<String>,
    /// Nombre de fois où ce couple (mission, bénévole) a atteint `annule`.
    /// À 2, toute nouvelle inscription est définitivement refusée.
    pub cancellation_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mission::Entity",
        from = "Column::MissionId",
        to = "super::mission::Column::Id"
    )]
    Mission,
}

impl Related<super::mission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
