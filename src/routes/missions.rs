use actix_web::{web, HttpResponse, Responder, get, post};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::models::dto::SearchFilters;
use crate::services::search_service::SearchService;
use crate::services::registration_service::RegistrationService;

/// Recherche multi-critères de missions, paginée.
/// POST plutôt que GET: les filtres (listes, geo) passent en corps JSON.
#[post("/search")]
pub async fn search_missions(
    db: web::Data<DatabaseConnection>,
    filters: web::Json<SearchFilters>,
) -> impl Responder {
    match SearchService::search(db.get_ref(), &filters).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.to_response(),
    }
}

/// Places restantes d'une mission. Valeur indicative pour l'affichage:
/// seule la réservation atomique fait foi au moment de l'inscription.
#[get("/{mission_id}/spots")]
pub async fn get_spots(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> impl Responder {
    match RegistrationService::spots(db.get_ref(), path.into_inner()).await {
        Ok(spots) => HttpResponse::Ok().json(spots),
        Err(e) => e.to_response(),
    }
}

/// Conclusion d'une mission dont la date de fin est passée: bascule les
/// inscriptions confirmées en `termine`. Appelé par le planificateur externe
/// (ou l'organisation) une fois la mission échue.
#[post("/{mission_id}/conclude")]
pub async fn conclude_mission(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    if !auth_user.is_organization() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only organizations can conclude a mission"
        }));
    }

    match RegistrationService::conclude_mission(db.get_ref(), path.into_inner()).await {
        Ok(concluded) => HttpResponse::Ok().json(serde_json::json!({
            "concluded": concluded
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/missions")
            .service(search_missions)
            .service(get_spots)
            .service(conclude_mission)
    );
}
