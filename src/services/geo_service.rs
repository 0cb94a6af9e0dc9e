// Calcul de distance orthodromique (haversine) et pré-filtre rectangulaire.
// Fonctions pures, sans effet de bord: utilisées par la recherche (filtre par
// rayon) et par tout appelant voulant afficher une distance.

/// Rayon terrestre moyen, en kilomètres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximation: 1 degré de latitude ~ 111 km
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Distance orthodromique entre deux points, arrondie à une décimale.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}

/// Rectangle englobant pour un pré-filtre SQL: évite de calculer la distance
/// exacte sur l'ensemble des missions. Les faux positifs du rectangle sont
/// éliminés ensuite par `distance_km`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

pub fn bounding_box(latitude: f64, longitude: f64, radius_km: f64) -> BoundingBox {
    let delta_lat = radius_km / KM_PER_DEGREE_LAT;
    // Les méridiens se resserrent avec la latitude; près des pôles le cosinus
    // tend vers 0, on le borne pour ne pas diviser par ~0.
    let cos_lat = latitude.to_radians().cos().abs().max(1e-6);
    let delta_lon = radius_km / (KM_PER_DEGREE_LAT * cos_lat);

    BoundingBox {
        min_lat: (latitude - delta_lat).max(-90.0),
        max_lat: (latitude + delta_lat).min(90.0),
        min_lon: (longitude - delta_lon).max(-180.0),
        max_lon: (longitude + delta_lon).min(180.0),
    }
}
