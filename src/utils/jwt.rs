use jsonwebtoken::{decode, Validation, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use std::env;

/// Claims attendus dans les tokens émis par le fournisseur d'identité.
/// Le moteur ne gère ni comptes ni sessions: il vérifie la signature et
/// extrait l'identité + le rôle.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,     // user_id
    pub role: String, // "volunteer" ou "organization"
    pub exp: i64,     // expiration timestamp
}

fn get_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        eprintln!("⚠️  WARNING: JWT_SECRET not found in .env, using default (INSECURE)");
        "default-insecure-key-change-this".to_string()
    })
}

/// Vérifie et décode un JWT émis par le fournisseur d'identité
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}
