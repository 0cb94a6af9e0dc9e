use std::cmp::Ordering;

use sea_orm::*;
use sea_orm::sea_query::Query;
use validator::Validate;

use crate::errors::{EngineError, EngineResult};
use crate::models::{mission, mission_skill};
use crate::models::mission::MissionStatus;
use crate::models::dto::{SearchFilters, SearchResponse, MissionSummary};
use crate::services::geo_service;

/// Compositeur de requêtes: traduit les critères de recherche en un jeu de
/// prédicats SeaORM, puis pagine. Tous les critères fournis sont combinés en
/// ET; les critères multi-valués (liste de formats, etc.) en OU sur le champ.
pub struct SearchService;

impl SearchService {
    /// `total` compte toutes les missions correspondantes avant pagination.
    /// Aucun résultat partiel n'est retourné si un filtre est invalide.
    pub async fn search(
        db: &DatabaseConnection,
        filters: &SearchFilters,
    ) -> EngineResult<SearchResponse> {
        filters
            .validate()
            .map_err(|e| EngineError::from_validation(&e))?;

        if let (Some(start), Some(end)) = (filters.start_from, filters.end_until) {
            if end < start {
                return Err(EngineError::Validation {
                    field: "end_until".to_string(),
                });
            }
        }

        let mut query = mission::Entity::find();

        // Sans filtre explicite, ne montrer que les missions actives.
        // Choix délibéré: les missions terminées ou annulées ne doivent
        // jamais apparaître par défaut dans la découverte.
        let status = filters.status.clone().unwrap_or(MissionStatus::Active);
        query = query.filter(mission::Column::Status.eq(status));

        if let Some(text) = filters.query.as_deref().filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(mission::Column::Title.contains(text))
                    .add(mission::Column::Description.contains(text)),
            );
        }

        if let Some(location) = filters.location.as_deref().filter(|l| !l.is_empty()) {
            query = query.filter(mission::Column::Location.contains(location));
        }

        if let Some(formats) = &filters.format {
            query = query.filter(mission::Column::Format.is_in(formats.to_vec()));
        }

        if let Some(levels) = &filters.difficulty_level {
            query = query.filter(mission::Column::DifficultyLevel.is_in(levels.to_vec()));
        }

        if let Some(levels) = &filters.engagement_level {
            query = query.filter(mission::Column::EngagementLevel.is_in(levels.to_vec()));
        }

        if let Some(types) = filters.mission_types.as_ref().filter(|t| !t.is_empty()) {
            query = query.filter(mission::Column::MissionTypeId.is_in(types.clone()));
        }

        if let Some(sectors) = filters.sectors.as_ref().filter(|s| !s.is_empty()) {
            query = query.filter(mission::Column::SectorId.is_in(sectors.clone()));
        }

        if let Some(skills) = filters.skills.as_ref().filter(|s| !s.is_empty()) {
            let sub_query = Query::select()
                .column(mission_skill::Column::MissionId)
                .from(mission_skill::Entity)
                .and_where(mission_skill::Column::SkillId.is_in(skills.clone()))
                .to_owned();
            query = query.filter(mission::Column::Id.in_subquery(sub_query));
        }

        if let Some(start) = filters.start_from {
            query = query.filter(mission::Column::StartDate.gte(start));
        }

        if let Some(end) = filters.end_until {
            query = query.filter(mission::Column::EndDate.lte(end));
        }

        match &filters.geo {
            Some(geo) => {
                // Pré-filtre rectangulaire en SQL pour ne pas évaluer la
                // distance exacte sur toute la table
                let bbox = geo_service::bounding_box(geo.latitude, geo.longitude, geo.radius_km);
                query = query
                    .filter(mission::Column::Latitude.between(bbox.min_lat, bbox.max_lat))
                    .filter(mission::Column::Longitude.between(bbox.min_lon, bbox.max_lon));

                let candidates = query.all(db).await?;

                let mut hits: Vec<(mission::Model, f64)> = candidates
                    .into_iter()
                    .filter_map(|m| match (m.latitude, m.longitude) {
                        (Some(lat), Some(lon)) => {
                            let d = geo_service::distance_km(geo.latitude, geo.longitude, lat, lon);
                            (d <= geo.radius_km).then_some((m, d))
                        }
                        _ => None,
                    })
                    .collect();

                hits.sort_by(|a, b| {
                    a.1.partial_cmp(&b.1)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| a.0.id.cmp(&b.0.id))
                });

                let total = hits.len() as u64;
                let start = (filters.page * filters.page_size) as usize;
                let missions: Vec<MissionSummary> = hits
                    .into_iter()
                    .skip(start)
                    .take(filters.page_size as usize)
                    .map(|(m, d)| MissionSummary::from_model(m, Some(d)))
                    .collect();

                Ok(SearchResponse { missions, total })
            }
            None => {
                let query = query
                    .order_by_asc(mission::Column::StartDate)
                    .order_by_asc(mission::Column::Id);

                let paginator = query.paginate(db, filters.page_size);
                let total = paginator.num_items().await?;
                let missions = paginator
                    .fetch_page(filters.page)
                    .await?
                    .into_iter()
                    .map(|m| MissionSummary::from_model(m, None))
                    .collect();

                Ok(SearchResponse { missions, total })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use crate::models::dto::{GeoFilter, OneOrMany};
    use crate::models::mission::MissionFormat;
    use crate::test_support::{setup_db, insert_mission, base_mission};

    #[tokio::test]
    async fn test_default_status_filter() {
        let db = setup_db().await;
        insert_mission(&db, base_mission("Mission active", 5)).await;
        let mut completed = base_mission("Mission terminée", 5);
        completed.status = Set(MissionStatus::Completed);
        insert_mission(&db, completed).await;

        let result = SearchService::search(&db, &SearchFilters::default()).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.missions[0].title, "Mission active");

        // Avec filtre explicite, les terminées redeviennent visibles
        let filters = SearchFilters {
            status: Some(MissionStatus::Completed),
            ..Default::default()
        };
        let result = SearchService::search(&db, &filters).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.missions[0].title, "Mission terminée");
    }

    #[tokio::test]
    async fn test_text_query_matches_title_or_description() {
        let db = setup_db().await;
        let mut m1 = base_mission("Maraude de nuit", 5);
        m1.description = Set("Distribution de repas chauds".to_string());
        insert_mission(&db, m1).await;
        let mut m2 = base_mission("Atelier informatique", 5);
        m2.description = Set("Initiation, maraude numérique".to_string());
        insert_mission(&db, m2).await;
        insert_mission(&db, base_mission("Collecte de livres", 5)).await;

        let filters = SearchFilters {
            query: Some("maraude".to_string()),
            ..Default::default()
        };
        let result = SearchService::search(&db, &filters).await.unwrap();
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_geo_radius_filter_sorted_by_distance() {
        let db = setup_db().await;
        let origin = (48.8566, 2.3522);

        // Missions décalées vers le nord de 0.5, 2, 6 et 11 km
        for (name, km) in [("proche", 0.5), ("quartier", 2.0), ("banlieue", 6.0), ("lointaine", 11.0)] {
            let mut m = base_mission(name, 5);
            m.latitude = Set(Some(origin.0 + km / 111.0));
            m.longitude = Set(Some(origin.1));
            insert_mission(&db, m).await;
        }
        // Mission sans coordonnées: jamais retournée en recherche géo
        insert_mission(&db, base_mission("sans coordonnées", 5)).await;

        let filters = SearchFilters {
            geo: Some(GeoFilter {
                latitude: origin.0,
                longitude: origin.1,
                radius_km: 5.0,
            }),
            ..Default::default()
        };
        let result = SearchService::search(&db, &filters).await.unwrap();

        assert_eq!(result.total, 2);
        let titles: Vec<&str> = result.missions.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["proche", "quartier"]);
        assert!(result.missions[0].distance_km.unwrap() < result.missions[1].distance_km.unwrap());
    }

    #[tokio::test]
    async fn test_negative_radius_rejected() {
        let db = setup_db().await;
        let filters = SearchFilters {
            geo: Some(GeoFilter {
                latitude: 48.0,
                longitude: 2.0,
                radius_km: -1.0,
            }),
            ..Default::default()
        };

        let err = SearchService::search(&db, &filters).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field } if field == "geo.radius_km"));
    }

    #[tokio::test]
    async fn test_reversed_date_range_rejected() {
        let db = setup_db().await;
        let now = Utc::now().naive_utc();
        let filters = SearchFilters {
            start_from: Some(now),
            end_until: Some(now - ChronoDuration::days(3)),
            ..Default::default()
        };

        let err = SearchService::search(&db, &filters).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field } if field == "end_until"));
    }

    #[tokio::test]
    async fn test_format_accepts_scalar_or_list() {
        let db = setup_db().await;
        let mut presentiel = base_mission("Sur place", 5);
        presentiel.format = Set(MissionFormat::Presentiel);
        insert_mission(&db, presentiel).await;
        let mut distanciel = base_mission("À distance", 5);
        distanciel.format = Set(MissionFormat::Distanciel);
        insert_mission(&db, distanciel).await;

        let filters = SearchFilters {
            format: Some(OneOrMany::One(MissionFormat::Distanciel)),
            ..Default::default()
        };
        assert_eq!(SearchService::search(&db, &filters).await.unwrap().total, 1);

        let filters = SearchFilters {
            format: Some(OneOrMany::Many(vec![
                MissionFormat::Presentiel,
                MissionFormat::Distanciel,
            ])),
            ..Default::default()
        };
        assert_eq!(SearchService::search(&db, &filters).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_skills_subquery() {
        let db = setup_db().await;
        let with_skill = insert_mission(&db, base_mission("Animation", 5)).await;
        insert_mission(&db, base_mission("Logistique", 5)).await;
        mission_skill::ActiveModel {
            mission_id: Set(with_skill.id),
            skill_id: Set(42),
        }
        .insert(&db)
        .await
        .unwrap();

        let filters = SearchFilters {
            skills: Some(vec![42]),
            ..Default::default()
        };
        let result = SearchService::search(&db, &filters).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.missions[0].id, with_skill.id);
    }

    #[tokio::test]
    async fn test_pagination_totals() {
        let db = setup_db().await;
        for i in 0..15 {
            insert_mission(&db, base_mission(&format!("Mission {i}"), 5)).await;
        }

        let page0 = SearchService::search(&db, &SearchFilters::default()).await.unwrap();
        assert_eq!(page0.total, 15);
        assert_eq!(page0.missions.len(), 12);

        let filters = SearchFilters {
            page: 1,
            ..Default::default()
        };
        let page1 = SearchService::search(&db, &filters).await.unwrap();
        assert_eq!(page1.total, 15);
        assert_eq!(page1.missions.len(), 3);
    }
}
