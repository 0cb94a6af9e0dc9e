use sea_orm::*;
use sea_orm::sea_query::Expr;

use crate::errors::{EngineError, EngineResult};
use crate::models::mission;

/// Registre autoritaire des inscriptions actives par mission.
///
/// `try_reserve` et `release` sont des UPDATE conditionnels: la comparaison
/// et l'incrément se font dans la même instruction SQL, côté base. Deux
/// `register` concurrents sur la dernière place ne peuvent donc pas réussir
/// tous les deux — le pattern "lire le compteur puis écrire" est interdit ici.
pub struct CapacityLedger;

impl CapacityLedger {
    /// Lecture du registre: (available_spots, active_count) en une requête.
    pub async fn snapshot<C: ConnectionTrait>(db: &C, mission_id: i32) -> EngineResult<(i32, i32)> {
        let mission = mission::Entity::find_by_id(mission_id)
            .one(db)
            .await?
            .ok_or(EngineError::NotFound)?;

        Ok((mission.available_spots, mission.active_count))
    }

    pub async fn active_count<C: ConnectionTrait>(db: &C, mission_id: i32) -> EngineResult<i32> {
        let (_, active) = Self::snapshot(db, mission_id).await?;
        Ok(active)
    }

    pub async fn remaining_spots<C: ConnectionTrait>(db: &C, mission_id: i32) -> EngineResult<i32> {
        let (available, active) = Self::snapshot(db, mission_id).await?;
        Ok((available - active).max(0))
    }

    /// Réserve une place si `active_count < available_spots`, atomiquement.
    /// Retourne false si la mission est pleine ou inconnue (l'appelant
    /// distingue les deux cas s'il en a besoin).
    pub async fn try_reserve<C: ConnectionTrait>(db: &C, mission_id: i32) -> Result<bool, DbErr> {
        let result = mission::Entity::update_many()
            .col_expr(
                mission::Column::ActiveCount,
                Expr::col(mission::Column::ActiveCount).add(1),
            )
            .filter(mission::Column::Id.eq(mission_id))
            .filter(
                Expr::col(mission::Column::ActiveCount)
                    .lt(Expr::col(mission::Column::AvailableSpots)),
            )
            .exec(db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Libère une place, plancher à 0.
    pub async fn release<C: ConnectionTrait>(db: &C, mission_id: i32) -> Result<(), DbErr> {
        mission::Entity::update_many()
            .col_expr(
                mission::Column::ActiveCount,
                Expr::col(mission::Column::ActiveCount).sub(1),
            )
            .filter(mission::Column::Id.eq(mission_id))
            .filter(Expr::col(mission::Column::ActiveCount).gt(0))
            .exec(db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{setup_db, insert_mission, base_mission};

    #[tokio::test]
    async fn test_reserve_until_full() {
        let db = setup_db().await;
        let m = insert_mission(&db, base_mission("Collecte alimentaire", 2)).await;

        assert!(CapacityLedger::try_reserve(&db, m.id).await.unwrap());
        assert!(CapacityLedger::try_reserve(&db, m.id).await.unwrap());
        assert!(!CapacityLedger::try_reserve(&db, m.id).await.unwrap());
        assert_eq!(CapacityLedger::active_count(&db, m.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_release_floors_at_zero() {
        let db = setup_db().await;
        let m = insert_mission(&db, base_mission("Maraude", 3)).await;

        CapacityLedger::release(&db, m.id).await.unwrap();
        assert_eq!(CapacityLedger::active_count(&db, m.id).await.unwrap(), 0);

        assert!(CapacityLedger::try_reserve(&db, m.id).await.unwrap());
        CapacityLedger::release(&db, m.id).await.unwrap();
        assert_eq!(CapacityLedger::active_count(&db, m.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reserve_unknown_mission() {
        let db = setup_db().await;
        assert!(!CapacityLedger::try_reserve(&db, 999).await.unwrap());
        assert!(matches!(
            CapacityLedger::active_count(&db, 999).await,
            Err(EngineError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_zero_capacity_mission() {
        let db = setup_db().await;
        let m = insert_mission(&db, base_mission("Mission complète", 0)).await;

        assert!(!CapacityLedger::try_reserve(&db, m.id).await.unwrap());
        assert_eq!(CapacityLedger::remaining_spots(&db, m.id).await.unwrap(), 0);
    }
}
