use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Table de jointure mission <-> compétence requise.
/// Les compétences elles-mêmes (libellés, catégories) sont gérées hors du
/// moteur; seul l'identifiant nous intéresse pour le filtrage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mission_skill")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub mission_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub skill_id: i32,
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
