use sea_orm::*;

use crate::models::registration;

/// Nombre d'annulations à partir duquel un bénévole ne peut plus se
/// réinscrire à la même mission. Constante de politique, pas configurable.
pub const MAX_CANCELLATIONS: i32 = 2;

/// Garde de politique d'annulation, par couple (mission, bénévole).
/// Le compteur est recalculé depuis l'historique persisté — jamais depuis un
/// compte fourni par le client. Annuler la mission A n'affecte pas
/// l'éligibilité à la mission B.
pub struct CancellationPolicy;

impl CancellationPolicy {
    pub async fn cancellation_count<C: ConnectionTrait>(
        db: &C,
        mission_id: i32,
        user_id: i32,
    ) -> Result<i32, DbErr> {
        let row = registration::Entity::find()
            .filter(registration::Column::MissionId.eq(mission_id))
            .filter(registration::Column::UserId.eq(user_id))
            .one(db)
            .await?;

        Ok(row.map(|r| r.cancellation_count).unwrap_or(0))
    }

    pub async fn allow_registration<C: ConnectionTrait>(
        db: &C,
        mission_id: i32,
        user_id: i32,
    ) -> Result<bool, DbErr> {
        let count = Self::cancellation_count(db, mission_id, user_id).await?;
        Ok(count < MAX_CANCELLATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registration::RegistrationStatus;
    use crate::test_support::{setup_db, insert_mission, base_mission};
    use chrono::Utc;

    async fn insert_cancelled_row(
        db: &DatabaseConnection,
        mission_id: i32,
        user_id: i32,
        cancellation_count: i32,
    ) {
        registration::ActiveModel {
            mission_id: Set(mission_id),
            user_id: Set(user_id),
            status: Set(RegistrationStatus::Annule),
            registration_date: Set(Utc::now().naive_utc()),
            cancellation_count: Set(cancellation_count),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_allows_without_history() {
        let db = setup_db().await;
        let m = insert_mission(&db, base_mission("Soutien scolaire", 5)).await;

        assert!(CancellationPolicy::allow_registration(&db, m.id, 1).await.unwrap());
        assert_eq!(CancellationPolicy::cancellation_count(&db, m.id, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blocks_at_threshold() {
        let db = setup_db().await;
        let m = insert_mission(&db, base_mission("Soutien scolaire", 5)).await;
        insert_cancelled_row(&db, m.id, 7, MAX_CANCELLATIONS).await;

        assert!(!CancellationPolicy::allow_registration(&db, m.id, 7).await.unwrap());
    }

    #[tokio::test]
    async fn test_scoped_to_mission_pair() {
        let db = setup_db().await;
        let a = insert_mission(&db, base_mission("Mission A", 5)).await;
        let b = insert_mission(&db, base_mission("Mission B", 5)).await;
        insert_cancelled_row(&db, a.id, 7, MAX_CANCELLATIONS).await;

        // Bloqué sur A, libre sur B; un autre bénévole reste libre sur A
        assert!(!CancellationPolicy::allow_registration(&db, a.id, 7).await.unwrap());
        assert!(CancellationPolicy::allow_registration(&db, b.id, 7).await.unwrap());
        assert!(CancellationPolicy::allow_registration(&db, a.id, 8).await.unwrap());
    }
}
