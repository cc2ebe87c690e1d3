// src/services/geo.rs

use crate::models::organization::OrganizationView;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Aproximações usadas no pré-filtro retangular
const KM_PER_DEGREE_LAT: f64 = 111.0;
const KM_PER_DEGREE_LON_AT_EQUATOR: f64 = 111.320;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Retângulo lat/lon; o filtro no banco trata os limites como inclusivos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Retângulo em volta do centro que cobre `radius_km`.
    /// O delta de longitude cresce com a latitude (os graus "encolhem").
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let delta_lat = radius_km / KM_PER_DEGREE_LAT;
        let delta_lon = radius_km / (KM_PER_DEGREE_LON_AT_EQUATOR * center.lat.to_radians().cos());

        Self {
            min_lat: center.lat - delta_lat,
            max_lat: center.lat + delta_lat,
            min_lon: center.lon - delta_lon,
            max_lon: center.lon + delta_lon,
        }
    }
}

/// Distância de grande círculo (haversine) em km.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

// ---
// Escolha do modo de busca
// ---
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchArea {
    /// Os quatro limites foram informados; sem cálculo de distância.
    Box(BoundingBox),
    /// Pré-filtro retangular + filtro exato por haversine.
    Radius { center: GeoPoint, radius_km: f64 },
    /// Nada informado: todas as organizações.
    Everywhere,
}

impl SearchArea {
    /// Modos mutuamente exclusivos, nesta ordem: retângulo, raio, tudo.
    pub fn select(
        center: GeoPoint,
        radius_km: Option<f64>,
        min_lat: Option<f64>,
        max_lat: Option<f64>,
        min_lon: Option<f64>,
        max_lon: Option<f64>,
    ) -> Self {
        if let (Some(min_lat), Some(max_lat), Some(min_lon), Some(max_lon)) =
            (min_lat, max_lat, min_lon, max_lon)
        {
            return SearchArea::Box(BoundingBox { min_lat, max_lat, min_lon, max_lon });
        }

        match radius_km {
            Some(radius_km) => SearchArea::Radius { center, radius_km },
            None => SearchArea::Everywhere,
        }
    }
}

/// Segunda fase do modo raio: mantém só quem está a `<= radius_km` do centro.
/// Candidatos sem prédio são descartados.
pub fn within_radius(
    center: GeoPoint,
    radius_km: f64,
    candidates: Vec<OrganizationView>,
) -> Vec<OrganizationView> {
    candidates
        .into_iter()
        .filter(|org| {
            org.building.as_ref().is_some_and(|b| {
                haversine_km(center, GeoPoint::new(b.latitude, b.longitude)) <= radius_km
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::building::Building;

    const MOSCOW_CENTER: GeoPoint = GeoPoint { lat: 55.7558, lon: 37.6173 };

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    // Mesma regra do filtro SQL (BETWEEN, inclusivo)
    fn in_box(bbox: &BoundingBox, point: GeoPoint) -> bool {
        point.lat >= bbox.min_lat
            && point.lat <= bbox.max_lat
            && point.lon >= bbox.min_lon
            && point.lon <= bbox.max_lon
    }

    fn org_at(id: i32, lat: f64, lon: f64) -> OrganizationView {
        OrganizationView {
            id,
            name: format!("org-{}", id),
            building: Some(Building {
                id,
                address: format!("addr-{}", id),
                latitude: lat,
                longitude: lon,
            }),
            phones: vec![],
            activities: vec![],
        }
    }

    #[test]
    fn haversine_same_point_is_zero() {
        assert_eq!(haversine_km(MOSCOW_CENTER, MOSCOW_CENTER), 0.0);
    }

    #[test]
    fn haversine_moscow_to_mytishchi() {
        let mytishchi = GeoPoint::new(55.9117, 37.7302);
        let dist = haversine_km(MOSCOW_CENTER, mytishchi);
        assert!(approx_eq(dist, 18.7, 1.0), "distância inesperada: {}", dist);
    }

    #[test]
    fn haversine_is_symmetric() {
        let kazan = GeoPoint::new(55.7963, 49.1088);
        assert!(approx_eq(
            haversine_km(MOSCOW_CENTER, kazan),
            haversine_km(kazan, MOSCOW_CENTER),
            1e-9
        ));
    }

    #[test]
    fn box_around_uses_lat_and_lon_deltas() {
        let bbox = BoundingBox::around(GeoPoint::new(0.0, 0.0), 111.0);
        assert!(approx_eq(bbox.min_lat, -1.0, 1e-12));
        assert!(approx_eq(bbox.max_lat, 1.0, 1e-12));
        assert!(approx_eq(bbox.max_lon, 111.0 / 111.320, 1e-12));
    }

    #[test]
    fn box_widens_in_longitude_at_high_latitude() {
        let equator = BoundingBox::around(GeoPoint::new(0.0, 0.0), 10.0);
        let north = BoundingBox::around(GeoPoint::new(60.0, 0.0), 10.0);
        assert!(north.max_lon - north.min_lon > equator.max_lon - equator.min_lon);
        assert!(approx_eq(north.max_lat - north.min_lat, equator.max_lat - equator.min_lat, 1e-12));
    }

    #[test]
    fn box_mode_wins_over_radius() {
        let area = SearchArea::select(MOSCOW_CENTER, Some(5.0), Some(55.0), Some(56.0), Some(37.0), Some(38.0));
        assert!(matches!(area, SearchArea::Box(_)));
    }

    #[test]
    fn incomplete_box_falls_back_to_radius() {
        let area = SearchArea::select(MOSCOW_CENTER, Some(5.0), Some(55.0), None, Some(37.0), Some(38.0));
        assert_eq!(area, SearchArea::Radius { center: MOSCOW_CENTER, radius_km: 5.0 });
    }

    #[test]
    fn nothing_selects_everywhere() {
        let area = SearchArea::select(MOSCOW_CENTER, None, Some(55.0), None, None, None);
        assert_eq!(area, SearchArea::Everywhere);
    }

    #[test]
    fn radius_excludes_far_and_keeps_center() {
        let candidates = vec![org_at(1, 55.7558, 37.6173), org_at(3, 55.9117, 37.7302)];
        let kept = within_radius(MOSCOW_CENTER, 5.0, candidates);
        assert_eq!(kept.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let target = GeoPoint::new(55.6761, 37.5066);
        let exact = haversine_km(MOSCOW_CENTER, target);

        let kept = within_radius(MOSCOW_CENTER, exact, vec![org_at(2, target.lat, target.lon)]);
        assert_eq!(kept.len(), 1);

        let kept = within_radius(MOSCOW_CENTER, exact - 1e-6, vec![org_at(2, target.lat, target.lon)]);
        assert!(kept.is_empty());
    }

    #[test]
    fn radius_result_is_subset_of_box_candidates() {
        let bbox = BoundingBox::around(MOSCOW_CENTER, 20.0);
        let all = vec![
            org_at(1, 55.7558, 37.6173),
            org_at(2, 55.6761, 37.5066),
            org_at(3, 55.9117, 37.7302),
            org_at(4, 55.7963, 49.1088),
        ];
        let candidates: Vec<_> = all
            .into_iter()
            .filter(|o| {
                let b = o.building.as_ref().unwrap();
                in_box(&bbox, GeoPoint::new(b.latitude, b.longitude))
            })
            .collect();
        let candidate_ids: Vec<i32> = candidates.iter().map(|o| o.id).collect();

        let kept = within_radius(MOSCOW_CENTER, 20.0, candidates);
        assert!(kept.iter().all(|o| candidate_ids.contains(&o.id)));
        assert!(!candidate_ids.contains(&4));
    }

    #[test]
    fn radius_drops_candidates_without_building() {
        let mut org = org_at(1, 55.7558, 37.6173);
        org.building = None;
        assert!(within_radius(MOSCOW_CENTER, 100.0, vec![org]).is_empty());
    }
}
