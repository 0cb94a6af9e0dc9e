// DTOs du moteur de recherche et d'inscription
use serde::{Serialize, Deserialize};
use chrono::NaiveDateTime;
use validator::Validate;

use crate::models::mission;
use crate::models::mission::{MissionStatus, MissionFormat, DifficultyLevel, EngagementLevel};
use crate::models::registration::RegistrationStatus;

/// Accepte indifféremment une valeur scalaire ou une liste dans le JSON
/// (`"format": "presentiel"` ou `"format": ["presentiel", "hybride"]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v.clone()],
            OneOrMany::Many(vs) => vs.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GeoFilter {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub radius_km: f64,
}

/// Critères de recherche de missions. Tous les champs sont optionnels et
/// combinés en ET; les champs multi-valués sont combinés en OU entre eux.
/// Sans filtre `status`, seules les missions actives sont retournées.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct SearchFilters {
    /// Recherche plein texte (sous-chaîne) sur titre OU description
    pub query: Option<String>,
    /// Sous-chaîne sur le lieu en texte libre
    pub location: Option<String>,
    pub format: Option<OneOrMany<MissionFormat>>,
    pub difficulty_level: Option<OneOrMany<DifficultyLevel>>,
    pub engagement_level: Option<OneOrMany<EngagementLevel>>,
    pub mission_types: Option<Vec<i32>>,
    pub sectors: Option<Vec<i32>>,
    pub skills: Option<Vec<i32>>,
    pub status: Option<MissionStatus>,
    /// Ne garder que les missions démarrant à partir de cette date
    pub start_from: Option<NaiveDateTime>,
    /// Ne garder que les missions se terminant au plus tard à cette date
    pub end_until: Option<NaiveDateTime>,
    #[validate(nested)]
    pub geo: Option<GeoFilter>,
    pub page: u64,
    #[validate(range(min = 1, max = 100))]
    pub page_size: u64,
}

pub const DEFAULT_PAGE_SIZE: u64 = 12;

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            query: None,
            location: None,
            format: None,
            difficulty_level: None,
            engagement_level: None,
            mission_types: None,
            sectors: None,
            skills: None,
            status: None,
            start_from: None,
            end_until: None,
            geo: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MissionSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration_minutes: i32,
    pub available_spots: i32,
    /// Places restantes affichées (available_spots - active_count).
    /// Valeur indicative: seul le Capacity Ledger fait foi à l'inscription.
    pub remaining_spots: i32,
    pub format: MissionFormat,
    pub difficulty_level: DifficultyLevel,
    pub engagement_level: EngagementLevel,
    pub status: MissionStatus,
    pub organization_id: i32,
    /// Distance au point de recherche, présent uniquement en recherche géo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl MissionSummary {
    pub fn from_model(m: mission::Model, distance_km: Option<f64>) -> Self {
        MissionSummary {
            id: m.id,
            title: m.title,
            description: m.description,
            location: m.location,
            latitude: m.latitude,
            longitude: m.longitude,
            start_date: m.start_date,
            end_date: m.end_date,
            duration_minutes: m.duration_minutes,
            available_spots: m.available_spots,
            remaining_spots: (m.available_spots - m.active_count).max(0),
            format: m.format,
            difficulty_level: m.difficulty_level,
            engagement_level: m.engagement_level,
            status: m.status,
            organization_id: m.organization_id,
            distance_km,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub missions: Vec<MissionSummary>,
    /// Nombre total de missions correspondantes, avant pagination
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: i32,
    pub mission_id: i32,
    pub user_id: i32,
    pub status: RegistrationStatus,
    pub registration_date: NaiveDateTime,
    pub confirmation_date: Option<NaiveDateTime>,
}

impl From<crate::models::registration::Model> for RegistrationResponse {
    fn from(r: crate::models::registration::Model) -> Self {
        RegistrationResponse {
            id: r.id,
            mission_id: r.mission_id,
            user_id: r.user_id,
            status: r.status,
            registration_date: r.registration_date,
            confirmation_date: r.confirmation_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpotsResponse {
    pub mission_id: i32,
    pub available_spots: i32,
    pub active_count: i32,
    pub remaining_spots: i32,
}
