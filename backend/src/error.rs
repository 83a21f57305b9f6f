use std::{fmt, io, path::PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Rejected user input. Always recoverable: prompt again or skip.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{axis} {value} out of range [-{limit}, {limit}]", limit = .axis.limit())]
    OutOfRange { axis: Axis, value: f64 },
    #[error("invalid date/time '{input}', use YYYY-MM-DD HH:MM: {source}")]
    InvalidTimestamp {
        input: String,
        source: chrono::ParseError,
    },
    #[error("end time {end} must be after start time {start}")]
    EmptyWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("travel window needs both a start and an end time")]
    IncompleteWindow,
}

/// A skipped line of a bulk load. Loading continues past it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseWarning {
    #[error("line {line}: expected 'lat,lon', got '{content}'")]
    MalformedLine { line: usize, content: String },
    #[error("line {line}: {source}")]
    OutOfRange { line: usize, source: ValidationError },
}

impl ParseWarning {
    pub fn line(&self) -> usize {
        match self {
            ParseWarning::MalformedLine { line, .. } | ParseWarning::OutOfRange { line, .. } => {
                *line
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("need at least 2 points to calculate distance, got {0}")]
pub struct InsufficientPoints(pub usize);

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InsufficientPoints(#[from] InsufficientPoints),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("failed to access {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("background export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl RouteError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| RouteError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_axis_and_bounds() {
        let err = ValidationError::OutOfRange {
            axis: Axis::Latitude,
            value: 91.0,
        };
        assert_eq!(err.to_string(), "latitude 91 out of range [-90, 90]");

        let err = ValidationError::OutOfRange {
            axis: Axis::Longitude,
            value: -180.5,
        };
        assert_eq!(err.to_string(), "longitude -180.5 out of range [-180, 180]");
    }

    #[test]
    fn warning_reports_line_number() {
        let warning = ParseWarning::MalformedLine {
            line: 4,
            content: "bad,line".into(),
        };
        assert_eq!(warning.line(), 4);
        assert_eq!(warning.to_string(), "line 4: expected 'lat,lon', got 'bad,line'");
    }
}
