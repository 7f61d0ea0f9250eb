//! Distance and bearing calculations over record streams, plus site selection.

use crate::data::{Parameters, PointPairStream, Rank, Site, SiteStream};
use crate::error::InputError;
use crate::geo::{self, GeoPoint};
use std::cmp::Ordering;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub origin: GeoPoint,
    pub target: GeoPoint,
    pub distance_km: f64,
    pub angle_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteMeasurement {
    pub site: Site,
    pub origin: GeoPoint,
    pub distance_km: f64,
    pub angle_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalculationResult {
    Measure(Measurement),
    Site(SiteMeasurement),
}

impl CalculationResult {
    pub fn origin(&self) -> GeoPoint {
        match self {
            CalculationResult::Measure(m) => m.origin,
            CalculationResult::Site(s) => s.origin,
        }
    }

    pub fn target(&self) -> GeoPoint {
        match self {
            CalculationResult::Measure(m) => m.target,
            CalculationResult::Site(s) => s.site.point,
        }
    }

    pub fn distance_km(&self) -> f64 {
        match self {
            CalculationResult::Measure(m) => m.distance_km,
            CalculationResult::Site(s) => s.distance_km,
        }
    }

    pub fn angle_deg(&self) -> f64 {
        match self {
            CalculationResult::Measure(m) => m.angle_deg,
            CalculationResult::Site(s) => s.angle_deg,
        }
    }
}

pub type ResultStream = Box<dyn Iterator<Item = Result<CalculationResult, InputError>>>;

pub fn measure(origin: GeoPoint, target: GeoPoint, params: &Parameters) -> Measurement {
    let distance_km = geo::great_circle_distance_km(origin, target);
    let angle_deg = geo::bearing_proxy_angle_deg(
        origin,
        target,
        params.heights.origin,
        params.heights.target,
    );

    if !angle_deg.is_finite() {
        warn!(
            origin_lat = origin.latitude,
            origin_lon = origin.longitude,
            target_lat = target.latitude,
            target_lon = target.longitude,
            "bearing proxy is undefined for this pair"
        );
    }

    Measurement {
        origin,
        target,
        distance_km,
        angle_deg,
    }
}

/// Radius checks compare the distance as displayed, rounded to 10 m.
fn within_radius(distance_km: f64, radius: Option<f64>) -> bool {
    let shown = (distance_km * 100.0).round() / 100.0;
    radius.is_none_or(|r| shown <= r)
}

// Apply calculations to a stream of point pairs
pub fn calculate_stream(data: PointPairStream, params: Parameters) -> ResultStream {
    let radius = params.selection.radius;
    Box::new(data.filter_map(move |pair| match pair {
        Ok((origin, target)) => {
            let m = measure(origin, target, &params);
            within_radius(m.distance_km, radius).then_some(Ok(CalculationResult::Measure(m)))
        }
        Err(err) => Some(Err(err)),
    }))
}

fn category_matches(category: Option<&str>, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    category.is_some_and(|c| wanted.iter().any(|w| c.contains(w.as_str())))
}

fn by_distance(a: &SiteMeasurement, b: &SiteMeasurement) -> Ordering {
    match (a.distance_km.is_nan(), b.distance_km.is_nan()) {
        (false, false) => a.distance_km.total_cmp(&b.distance_km),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Measures every site against `origin`, keeps those inside the radius and
/// matching the requested categories, sorted by ascending distance and cut
/// down to `--limit` from the ranked end.
pub fn select_sites(
    sites: SiteStream,
    origin: GeoPoint,
    params: &Parameters,
) -> Result<Vec<SiteMeasurement>, InputError> {
    let selection = &params.selection;
    let radius = selection.site_radius();

    let mut total = 0usize;
    let mut kept = Vec::new();
    for site in sites {
        let site = site?;
        total += 1;
        if !category_matches(site.category.as_deref(), &selection.categories) {
            continue;
        }
        let m = measure(origin, site.point, params);
        if within_radius(m.distance_km, Some(radius)) {
            kept.push(SiteMeasurement {
                site,
                origin,
                distance_km: m.distance_km,
                angle_deg: m.angle_deg,
            });
        }
    }

    kept.sort_by(by_distance);

    if let Some(limit) = selection.limit
        && kept.len() > limit
    {
        match selection.rank {
            Rank::Nearest => kept.truncate(limit),
            Rank::Farthest => {
                kept.drain(..kept.len() - limit);
            }
        }
    }

    debug!(
        total,
        selected = kept.len(),
        radius_km = radius,
        rank = %selection.rank,
        "site selection finished"
    );

    Ok(kept)
}

pub fn site_stream(sites: Vec<SiteMeasurement>) -> ResultStream {
    Box::new(sites.into_iter().map(|s| Ok(CalculationResult::Site(s))))
}
