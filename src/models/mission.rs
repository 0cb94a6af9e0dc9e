use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Statut du cycle de vie d'une mission.
/// Si aucun filtre de statut n'est fourni à la recherche, seules les
/// missions `active` sont retournées.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MissionFormat {
    #[sea_orm(string_value = "presentiel")]
    Presentiel,
    #[sea_orm(string_value = "distanciel")]
    Distanciel,
    #[sea_orm(string_value = "hybride")]
    Hybride,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[sea_orm(string_value = "debutant")]
    Debutant,
    #[sea_orm(string_value = "intermediaire")]
    Intermediaire,
    #[sea_orm(string_value = "experimente")]
    Experimente,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    #[sea_orm(string_value = "ponctuel")]
    Ponctuel,
    #[sea_orm(string_value = "regulier")]
    Regulier,
    #[sea_orm(string_value = "intensif")]
    Intensif,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Lieu en texte libre ("Maison de quartier, Lyon 7e")
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub duration_minutes: i32,
    /// Capacité déclarée par l'organisation (>= 0)
    pub available_spots: i32,

    // Compteur autoritaire d'inscriptions actives (inscrit/confirme/termine).
    // Mis à jour UNIQUEMENT par le Capacity Ledger via un UPDATE conditionnel:
    //   active_count < available_spots  pour réserver
    //   active_count > 0               pour libérer
    // Jamais par un read-then-write côté appelant.
    pub active_count: i32,

    pub format: MissionFormat,
    pub difficulty_level: DifficultyLevel,
    pub engagement_level: EngagementLevel,
    pub status: MissionStatus,
    /// Référence vers l'organisation (gérée hors du moteur)
    pub organization_id: i32,
    pub mission_type_id: Option<i32>,
    pub sector_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::registration::Entity")]
    Registration,

    #[sea_orm(has_many = "super::mission_skill::Entity")]
    MissionSkill,
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registration.def()
    }
}

impl Related<super::mission_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MissionSkill.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
