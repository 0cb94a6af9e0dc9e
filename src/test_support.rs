// Outils partagés des tests de services: base sqlite en mémoire avec le
// schéma créé depuis les entités, et fixtures de missions.
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Set};
use sea_orm::sea_query::Index;

use crate::models::{mission, mission_skill, registration};
use crate::models::mission::{MissionStatus, MissionFormat, DifficultyLevel, EngagementLevel};

pub async fn setup_db() -> DatabaseConnection {
    // Une seule connexion: chaque connexion sqlite ":memory:" ouvrirait
    // sa propre base vide
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts)
        .await
        .expect("failed to open in-memory sqlite");
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    for stmt in [
        schema.create_table_from_entity(mission::Entity),
        schema.create_table_from_entity(registration::Entity),
        schema.create_table_from_entity(mission_skill::Entity),
    ] {
        db.execute(backend.build(&stmt))
            .await
            .expect("failed to create table");
    }

    // Même index unique que le schéma de production: une seule ligne
    // registration par couple (mission, bénévole)
    let unique_pair = Index::create()
        .name("uq_registration_mission_user")
        .table(registration::Entity)
        .col(registration::Column::MissionId)
        .col(registration::Column::UserId)
        .unique()
        .to_owned();
    db.execute(backend.build(&unique_pair))
        .await
        .expect("failed to create unique index");

    db
}

/// Mission active dans une semaine, sans coordonnées, prête à être ajustée
/// champ par champ dans chaque test.
pub fn base_mission(title: &str, available_spots: i32) -> mission::ActiveModel {
    let start = Utc::now().naive_utc() + Duration::days(7);
    mission::ActiveModel {
        title: Set(title.to_string()),
        description: Set(String::new()),
        location: Set("Lyon".to_string()),
        latitude: Set(None),
        longitude: Set(None),
        start_date: Set(start),
        end_date: Set(start + Duration::hours(3)),
        duration_minutes: Set(180),
        available_spots: Set(available_spots),
        active_count: Set(0),
        format: Set(MissionFormat::Presentiel),
        difficulty_level: Set(DifficultyLevel::Debutant),
        engagement_level: Set(EngagementLevel::Ponctuel),
        status: Set(MissionStatus::Active),
        organization_id: Set(1),
        mission_type_id: Set(None),
        sector_id: Set(None),
        ..Default::default()
    }
}

pub async fn insert_mission(
    db: &DatabaseConnection,
    model: mission::ActiveModel,
) -> mission::Model {
    model.insert(db).await.expect("failed to insert mission")
}
