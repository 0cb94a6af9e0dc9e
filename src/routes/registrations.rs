use actix_web::{web, HttpResponse, Responder, post};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::models::dto::{CancelRequest, RegistrationResponse};
use crate::services::registration_service::RegistrationService;

/// Inscription du bénévole authentifié à une mission.
#[post("/{mission_id}/register")]
pub async fn register(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    let mission_id = path.into_inner();

    match RegistrationService::register(db.get_ref(), mission_id, auth_user.user_id).await {
        Ok(model) => HttpResponse::Created().json(RegistrationResponse::from(model)),
        Err(e) => e.to_response(),
    }
}

/// Annulation de l'inscription active du bénévole authentifié.
/// Le corps est optionnel ({"reason": "..."} pour tracer le motif).
#[post("/{mission_id}/cancel")]
pub async fn cancel(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: Option<web::Json<CancelRequest>>,
) -> impl Responder {
    let mission_id = path.into_inner();
    let reason = body.and_then(|b| b.into_inner().reason);

    match RegistrationService::cancel(db.get_ref(), mission_id, auth_user.user_id, reason).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_response(),
    }
}

/// Confirmation d'une inscription par l'organisation.
#[post("/{mission_id}/confirm/{user_id}")]
pub async fn confirm(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<(i32, i32)>,
) -> impl Responder {
    if !auth_user.is_organization() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only organizations can confirm registrations"
        }));
    }

    let (mission_id, user_id) = path.into_inner();

    match RegistrationService::confirm(db.get_ref(), mission_id, user_id).await {
        Ok(model) => HttpResponse::Ok().json(RegistrationResponse::from(model)),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/registrations")
            .service(register)
            .service(cancel)
            .service(confirm)
    );
}
