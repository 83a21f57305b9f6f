use geo::{Distance, Geodesic};
use geo_types::Point;

use crate::{
    error::InsufficientPoints,
    models::{GeoPoint, RouteSummary, TimeWindow},
};

const EARTH_RADIUS_KM: f64 = 6_371.0;
pub const METERS_PER_NAUTICAL_MILE: f64 = 1_852.0;

/// Distance between two waypoints in nautical miles.
///
/// Implementations must be symmetric. Any `Fn(GeoPoint, GeoPoint) -> f64`
/// qualifies, which keeps test doubles trivial.
pub trait DistanceMetric: Send + Sync {
    fn distance_nm(&self, a: GeoPoint, b: GeoPoint) -> f64;
}

impl<F> DistanceMetric for F
where
    F: Fn(GeoPoint, GeoPoint) -> f64 + Send + Sync,
{
    fn distance_nm(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        self(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    /// Ellipsoidal geodesic on WGS-84
    #[default]
    Wgs84,
    /// Haversine on a spherical Earth
    GreatCircle,
}

impl DistanceMetric for Metric {
    fn distance_nm(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        match self {
            Metric::Wgs84 => geodesic_nm(a, b),
            Metric::GreatCircle => haversine_nm(a, b),
        }
    }
}

pub fn geodesic_nm(a: GeoPoint, b: GeoPoint) -> f64 {
    Geodesic.distance(to_point(a), to_point(b)) / METERS_PER_NAUTICAL_MILE
}

pub fn haversine_nm(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let dlat = (b.lat() - a.lat()).to_radians();
    let dlon = (b.lon() - a.lon()).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // clamp guards asin against rounding just above 1 for antipodes
    let km = 2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin();
    km * 1_000.0 / METERS_PER_NAUTICAL_MILE
}

fn to_point(p: GeoPoint) -> Point<f64> {
    Point::new(p.lon(), p.lat())
}

/// Returns `0.0` when the duration is zero or negative: speed is unknown,
/// not an error.
pub fn average_speed(total_distance_nm: f64, duration_hours: f64) -> f64 {
    if duration_hours <= 0.0 {
        0.0
    } else {
        total_distance_nm / duration_hours
    }
}

/// Stateless distance and speed computation over a route snapshot.
#[derive(Debug, Clone, Default)]
pub struct RouteCalculator<M = Metric> {
    metric: M,
}

impl<M: DistanceMetric> RouteCalculator<M> {
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Sum of consecutive-pair distances in nautical miles.
    pub fn total_distance(&self, route: &[GeoPoint]) -> Result<f64, InsufficientPoints> {
        if route.len() < 2 {
            return Err(InsufficientPoints(route.len()));
        }
        Ok(route
            .windows(2)
            .map(|pair| self.metric.distance_nm(pair[0], pair[1]))
            .sum())
    }

    pub fn summarize(
        &self,
        route: &[GeoPoint],
        window: Option<&TimeWindow>,
    ) -> Result<RouteSummary, InsufficientPoints> {
        let total_distance_nm = self.total_distance(route)?;
        let duration_hours = window.map_or(0.0, TimeWindow::duration_hours);

        Ok(RouteSummary {
            total_distance_nm,
            average_speed_knots: average_speed(total_distance_nm, duration_hours),
            point_count: route.len(),
            window: window.copied(),
        })
    }
}
