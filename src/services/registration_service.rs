use std::time::Duration;

use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::{NaiveDateTime, Utc};

use crate::errors::{EngineError, EngineResult};
use crate::models::{mission, registration};
use crate::models::dto::SpotsResponse;
use crate::models::mission::MissionStatus;
use crate::models::registration::RegistrationStatus;
use crate::services::capacity_ledger::CapacityLedger;
use crate::services::cancellation_policy::CancellationPolicy;

/// Nombre de tentatives sur erreur transitoire du stockage (conflit de
/// verrou, timeout) avant de remonter `Unavailable`.
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 50;

/// Machine à états des inscriptions, par couple (mission, bénévole).
///
/// États persistés: inscrit, confirme, termine, annule. "Non inscrit" est un
/// état virtuel: absence de ligne. La machine ne détient aucun état mutable
/// propre — tous les effets passent par le Capacity Ledger et le compteur
/// d'annulations, dans une transaction unique par opération.
pub struct RegistrationService;

impl RegistrationService {
    /// Inscrit un bénévole à une mission.
    ///
    /// Gardes, dans l'ordre: pas d'inscription active existante, politique
    /// d'annulation, puis réservation atomique d'une place. La réservation
    /// est un UPDATE conditionnel: si deux appels concurrents visent la
    /// dernière place, un seul passe, l'autre reçoit `CapacityExceeded`.
    pub async fn register(
        db: &DatabaseConnection,
        mission_id: i32,
        user_id: i32,
    ) -> EngineResult<registration::Model> {
        let mut attempt = 1;
        loop {
            match Self::register_once(db, mission_id, user_id).await {
                Err(EngineError::Database(e)) if is_transient(&e) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(EngineError::Unavailable);
                    }
                    tracing::warn!(mission_id, user_id, attempt, error = %e,
                        "transient storage error during register, retrying");
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn register_once(
        db: &DatabaseConnection,
        mission_id: i32,
        user_id: i32,
    ) -> EngineResult<registration::Model> {
        let txn = db.begin().await?;

        let existing = registration::Entity::find()
            .filter(registration::Column::MissionId.eq(mission_id))
            .filter(registration::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        if let Some(r) = &existing {
            if r.status.is_active() {
                return Err(EngineError::AlreadyRegistered);
            }
        }

        if !CancellationPolicy::allow_registration(&txn, mission_id, user_id).await? {
            return Err(EngineError::CancellationLimitExceeded);
        }

        if !CapacityLedger::try_reserve(&txn, mission_id).await? {
            // L'UPDATE ne touche aucune ligne si la mission est pleine OU
            // inconnue: on distingue les deux cas ici.
            let exists = mission::Entity::find_by_id(mission_id).one(&txn).await?.is_some();
            return Err(if exists {
                EngineError::CapacityExceeded
            } else {
                EngineError::NotFound
            });
        }

        let now = Utc::now().naive_utc();

        let saved = match existing {
            // Ré-inscription: la ligne annulée repasse à `inscrit` par un
            // UPDATE conditionné sur le statut. Si une réactivation
            // concurrente est passée entre la lecture et ici, l'UPDATE ne
            // touche aucune ligne et la place réservée est rendue par le
            // rollback. Le compteur d'annulations est conservé.
            Some(r) => {
                let reactivated = registration::Entity::update_many()
                    .col_expr(
                        registration::Column::Status,
                        Expr::value(RegistrationStatus::Inscrit),
                    )
                    .col_expr(registration::Column::RegistrationDate, Expr::value(now))
                    .col_expr(
                        registration::Column::ConfirmationDate,
                        Expr::value(Option::<NaiveDateTime>::None),
                    )
                    .col_expr(
                        registration::Column::CancellationDate,
                        Expr::value(Option::<NaiveDateTime>::None),
                    )
                    .col_expr(
                        registration::Column::CancellationReason,
                        Expr::value(Option::<String>::None),
                    )
                    .filter(registration::Column::Id.eq(r.id))
                    .filter(registration::Column::Status.eq(RegistrationStatus::Annule))
                    .exec(&txn)
                    .await?;

                if reactivated.rows_affected == 0 {
                    return Err(EngineError::AlreadyRegistered);
                }

                registration::Entity::find_by_id(r.id)
                    .one(&txn)
                    .await?
                    .ok_or(EngineError::NotFound)?
            }
            None => {
                let inserted = registration::ActiveModel {
                    mission_id: Set(mission_id),
                    user_id: Set(user_id),
                    status: Set(RegistrationStatus::Inscrit),
                    registration_date: Set(now),
                    cancellation_count: Set(0),
                    ..Default::default()
                }
                .insert(&txn)
                .await;

                match inserted {
                    Ok(model) => model,
                    // Perdant d'une course sur le même couple: l'index unique
                    // (mission_id, user_id) a rejeté l'insertion; la place
                    // réservée est rendue par le rollback de la transaction.
                    Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                        return Err(EngineError::AlreadyRegistered);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        txn.commit().await?;

        tracing::info!(mission_id, user_id, registration_id = saved.id, "volunteer registered");
        Ok(saved)
    }

    /// Annule l'inscription active d'un bénévole.
    /// Libère la place réservée et incrémente le compteur d'annulations:
    /// la mission redevient immédiatement éligible pour d'autres bénévoles.
    pub async fn cancel(
        db: &DatabaseConnection,
        mission_id: i32,
        user_id: i32,
        reason: Option<String>,
    ) -> EngineResult<()> {
        let mut attempt = 1;
        loop {
            match Self::cancel_once(db, mission_id, user_id, reason.clone()).await {
                Err(EngineError::Database(e)) if is_transient(&e) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(EngineError::Unavailable);
                    }
                    tracing::warn!(mission_id, user_id, attempt, error = %e,
                        "transient storage error during cancel, retrying");
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn cancel_once(
        db: &DatabaseConnection,
        mission_id: i32,
        user_id: i32,
        reason: Option<String>,
    ) -> EngineResult<()> {
        let txn = db.begin().await?;

        let existing = registration::Entity::find()
            .filter(registration::Column::MissionId.eq(mission_id))
            .filter(registration::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let reg = match existing {
            None => return Err(EngineError::NotRegistered),
            Some(r) => r,
        };

        match reg.status {
            RegistrationStatus::Annule => return Err(EngineError::NotRegistered),
            RegistrationStatus::Termine => return Err(EngineError::TerminalState),
            RegistrationStatus::Inscrit | RegistrationStatus::Confirme => {}
        }

        let count = reg.cancellation_count + 1;
        let mut active: registration::ActiveModel = reg.into();
        active.status = Set(RegistrationStatus::Annule);
        active.cancellation_date = Set(Some(Utc::now().naive_utc()));
        active.cancellation_reason = Set(reason);
        active.cancellation_count = Set(count);
        active.update(&txn).await?;

        CapacityLedger::release(&txn, mission_id).await?;

        txn.commit().await?;

        tracing::info!(mission_id, user_id, cancellation_count = count, "registration cancelled");
        Ok(())
    }

    /// L'organisation confirme une inscription (`inscrit` -> `confirme`).
    /// Garde: la mission est encore active. Confirmer une inscription déjà
    /// confirmée est idempotent.
    pub async fn confirm(
        db: &DatabaseConnection,
        mission_id: i32,
        user_id: i32,
    ) -> EngineResult<registration::Model> {
        let txn = db.begin().await?;

        let mission = mission::Entity::find_by_id(mission_id)
            .one(&txn)
            .await?
            .ok_or(EngineError::NotFound)?;

        if mission.status != MissionStatus::Active {
            return Err(EngineError::TerminalState);
        }

        let existing = registration::Entity::find()
            .filter(registration::Column::MissionId.eq(mission_id))
            .filter(registration::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let reg = match existing {
            None => return Err(EngineError::NotRegistered),
            Some(r) => r,
        };

        let saved = match reg.status {
            RegistrationStatus::Annule => return Err(EngineError::NotRegistered),
            RegistrationStatus::Termine => return Err(EngineError::TerminalState),
            RegistrationStatus::Confirme => reg,
            RegistrationStatus::Inscrit => {
                let mut active: registration::ActiveModel = reg.into();
                active.status = Set(RegistrationStatus::Confirme);
                active.confirmation_date = Set(Some(Utc::now().naive_utc()));
                active.update(&txn).await?
            }
        };

        txn.commit().await?;
        Ok(saved)
    }

    /// Point d'entrée du planificateur externe: une fois la date de fin
    /// passée, bascule toutes les inscriptions confirmées en `termine` et
    /// marque la mission `completed`. Retourne le nombre d'inscriptions
    /// conclues.
    pub async fn conclude_mission(db: &DatabaseConnection, mission_id: i32) -> EngineResult<u64> {
        let txn = db.begin().await?;

        let mission = mission::Entity::find_by_id(mission_id)
            .one(&txn)
            .await?
            .ok_or(EngineError::NotFound)?;

        if mission.end_date > Utc::now().naive_utc() {
            return Err(EngineError::Validation {
                field: "end_date".to_string(),
            });
        }

        let confirmed = registration::Entity::find()
            .filter(registration::Column::MissionId.eq(mission_id))
            .filter(registration::Column::Status.eq(RegistrationStatus::Confirme))
            .all(&txn)
            .await?;

        let concluded = confirmed.len() as u64;
        for reg in confirmed {
            let mut active: registration::ActiveModel = reg.into();
            active.status = Set(RegistrationStatus::Termine);
            active.update(&txn).await?;
        }

        if mission.status == MissionStatus::Active {
            let mut active: mission::ActiveModel = mission.into();
            active.status = Set(MissionStatus::Completed);
            active.update(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(mission_id, concluded, "mission concluded");
        Ok(concluded)
    }

    pub async fn active_count(db: &DatabaseConnection, mission_id: i32) -> EngineResult<i32> {
        CapacityLedger::active_count(db, mission_id).await
    }

    pub async fn remaining_spots(db: &DatabaseConnection, mission_id: i32) -> EngineResult<i32> {
        CapacityLedger::remaining_spots(db, mission_id).await
    }

    /// Vue d'affichage des places d'une mission, en une lecture du registre.
    pub async fn spots(db: &DatabaseConnection, mission_id: i32) -> EngineResult<SpotsResponse> {
        let (available_spots, active_count) = CapacityLedger::snapshot(db, mission_id).await?;
        Ok(SpotsResponse {
            mission_id,
            available_spots,
            active_count,
            remaining_spots: (available_spots - active_count).max(0),
        })
    }
}

/// Conflits de verrou / sérialisation et pertes de connexion passagères:
/// l'opération est rejouable telle quelle.
fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        other => {
            let msg = other.to_string().to_lowercase();
            msg.contains("lock") || msg.contains("deadlock") || msg.contains("serialize")
        }
    }
}
