pub mod health;
pub mod missions;
pub mod registrations;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(missions::configure)
            .configure(registrations::configure)
    );
}
