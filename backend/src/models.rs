use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Axis, ValidationError};

pub use shared::{
    ApiError, Coordinate, ParsePointsRequest, ParsePointsResponse, SummaryRequest,
    SummaryResponse,
};

/// Input and display form of travel timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A validated waypoint. Only constructible through [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        check_axis(Axis::Latitude, lat)?;
        check_axis(Axis::Longitude, lon)?;
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

fn check_axis(axis: Axis, value: f64) -> Result<(), ValidationError> {
    let limit = axis.limit();
    // NaN fails the containment check as well
    if (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { axis, value })
    }
}

impl From<GeoPoint> for Coordinate {
    fn from(point: GeoPoint) -> Self {
        Coordinate {
            lat: point.lat,
            lon: point.lon,
        }
    }
}

impl TryFrom<Coordinate> for GeoPoint {
    type Error = ValidationError;

    fn try_from(coord: Coordinate) -> Result<Self, Self::Error> {
        GeoPoint::new(coord.lat, coord.lon)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let coord = Coordinate::deserialize(deserializer)?;
        GeoPoint::try_from(coord).map_err(serde::de::Error::custom)
    }
}

/// Travel interval; `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both ends in `YYYY-MM-DD HH:MM` form.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Build a window from optional inputs. Both absent means no window.
    pub fn from_optional(
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::parse(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(ValidationError::IncompleteWindow),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Start: {} | End: {}",
            self.start.format(TIMESTAMP_FORMAT),
            self.end.format(TIMESTAMP_FORMAT)
        )
    }
}

fn parse_timestamp(input: &str) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).map_err(|source| {
        ValidationError::InvalidTimestamp {
            input: trimmed.to_string(),
            source,
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub total_distance_nm: f64,
    pub average_speed_knots: f64,
    pub point_count: usize,
    pub window: Option<TimeWindow>,
}

impl RouteSummary {
    pub fn travel_hours(&self) -> f64 {
        self.window.map_or(0.0, |w| w.duration_hours())
    }

    pub fn start_label(&self) -> String {
        self.window
            .map_or_else(|| "N/A".to_string(), |w| w.start.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn end_label(&self) -> String {
        self.window
            .map_or_else(|| "N/A".to_string(), |w| w.end.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Distance: {:.2} nmi", self.total_distance_nm)?;
        writeln!(f, "Travel Time: {:.1} hours", self.travel_hours())?;
        write!(f, "Average Speed: {:.2} knots", self.average_speed_knots)
    }
}
