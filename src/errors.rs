// Taxonomie d'erreurs du moteur. Toutes sont récupérables par l'appelant:
// le moteur ne termine jamais le processus, il retourne un Result typé que
// les routes traduisent en réponse HTTP distinguable (kind stable).
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid value for field `{field}`")]
    Validation { field: String },

    #[error("mission is full")]
    CapacityExceeded,

    #[error("re-registration blocked: cancellation limit reached for this mission")]
    CancellationLimitExceeded,

    #[error("an active registration already exists for this mission")]
    AlreadyRegistered,

    #[error("no active registration for this mission")]
    NotRegistered,

    #[error("registration already completed")]
    TerminalState,

    #[error("mission not found")]
    NotFound,

    #[error("storage unavailable after retries")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Identifiant stable et lisible machine, renvoyé dans le corps JSON
    /// pour que le front distingue "complet" de "bloqué par la politique
    /// d'annulation" sans parser de message.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation_error",
            EngineError::CapacityExceeded => "capacity_exceeded",
            EngineError::CancellationLimitExceeded => "cancellation_limit_exceeded",
            EngineError::AlreadyRegistered => "already_registered",
            EngineError::NotRegistered => "not_registered",
            EngineError::TerminalState => "terminal_state",
            EngineError::NotFound => "not_found",
            EngineError::Unavailable => "unavailable",
            EngineError::Database(_) => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::CapacityExceeded
            | EngineError::AlreadyRegistered
            | EngineError::NotRegistered
            | EngineError::TerminalState => StatusCode::CONFLICT,
            EngineError::CancellationLimitExceeded => StatusCode::FORBIDDEN,
            EngineError::NotFound => StatusCode::NOT_FOUND,
            EngineError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> HttpResponse {
        if let EngineError::Database(e) = self {
            tracing::error!(error = %e, "unexpected database error");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }))
    }

    /// Convertit les erreurs du crate `validator` en nommant le premier
    /// champ fautif, y compris à travers les structs imbriquées (geo.radius_km).
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        fn first_field(errors: &ValidationErrors) -> Option<String> {
            errors.errors().iter().next().map(|(field, kind)| match kind {
                ValidationErrorsKind::Struct(inner) => match first_field(inner) {
                    Some(nested) => format!("{field}.{nested}"),
                    None => field.to_string(),
                },
                ValidationErrorsKind::List(items) => items
                    .values()
                    .next()
                    .and_then(|inner| first_field(inner))
                    .map(|nested| format!("{field}.{nested}"))
                    .unwrap_or_else(|| field.to_string()),
                ValidationErrorsKind::Field(_) => field.to_string(),
            })
        }

        EngineError::Validation {
            field: first_field(errors).unwrap_or_else(|| "request".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_nested_validation_field_is_named() {
        let filters = crate::models::dto::SearchFilters {
            geo: Some(crate::models::dto::GeoFilter {
                latitude: 48.0,
                longitude: 2.0,
                radius_km: -5.0,
            }),
            ..Default::default()
        };

        let err = EngineError::from_validation(&filters.validate().unwrap_err());
        match err {
            EngineError::Validation { field } => assert_eq!(field, "geo.radius_km"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        assert_ne!(
            EngineError::CapacityExceeded.kind(),
            EngineError::CancellationLimitExceeded.kind()
        );
    }
}
