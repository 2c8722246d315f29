//! Grid based timing shared by both notations.
//!
//! Every event is addressed by a measure number and a grid offset inside that measure. The
//! number of grids in a measure (`grids_per_measure`, usually 384) fixes the resolution, and
//! a beat is always a quarter of a measure. Lengths are written as [`Duration`] expressions
//! and converted to grid counts with [`grid_length`].

use std::str::FromStr;

use thiserror::Error;

/// The resolution used when a chart does not say otherwise.
pub const DEFAULT_GRIDS_PER_MEASURE: u32 = 384;

/// A position on the score, ordered by measure then grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridTime {
    /// The measure, starting with 1 in Simai charts.
    pub measure: u32,
    /// The grid offset inside the measure, in `[0, grids_per_measure)`.
    pub grid: u32,
}

impl GridTime {
    /// The first grid of the first measure, where a Simai note stream starts.
    pub const START: Self = Self::new(1, 0);

    /// Creates a time without normalizing it.
    #[must_use]
    pub const fn new(measure: u32, grid: u32) -> Self {
        Self { measure, grid }
    }

    /// Creates a time, carrying a grid overflow into the measure number.
    #[must_use]
    pub fn normalized(measure: u32, grid: u64, grids_per_measure: u32) -> Self {
        let per_measure = u64::from(grids_per_measure.max(1));
        Self {
            measure: measure + (grid / per_measure) as u32,
            grid: (grid % per_measure) as u32,
        }
    }

    /// Rebuilds a time from an absolute grid count.
    #[must_use]
    pub fn from_absolute(absolute: u64, grids_per_measure: u32) -> Self {
        Self::normalized(0, absolute, grids_per_measure)
    }

    /// The absolute grid count `measure * grids_per_measure + grid`.
    #[must_use]
    pub fn absolute(self, grids_per_measure: u32) -> u64 {
        u64::from(self.measure) * u64::from(grids_per_measure) + u64::from(self.grid)
    }

    /// Returns this time moved forward by `grids`.
    #[must_use]
    pub fn advanced(self, grids: u64, grids_per_measure: u32) -> Self {
        Self::normalized(self.measure, u64::from(self.grid) + grids, grids_per_measure)
    }
}

impl std::fmt::Display for GridTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.measure, self.grid)
    }
}

/// An error from reading a duration expression.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationError {
    /// The expression matches none of `n`, `d:l`, `#s`, `bpm#s` or `w##t`.
    #[error("unrecognized duration format `{expr}`")]
    InvalidDurationFormat {
        /// The expression as written.
        expr: String,
    },
    /// The tempo of a `bpm#s` expression is not a positive number.
    #[error("invalid BPM value in duration `{expr}`")]
    InvalidBpm {
        /// The expression as written.
        expr: String,
    },
}

/// A length written in one of the notation's duration forms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Duration {
    /// `n`: one n-th of a measure.
    Divisor(f64),
    /// `d:l`: `l` units of a measure split into `d`.
    Ratio {
        /// How many parts the measure is split into.
        divisor: f64,
        /// How many parts the length spans.
        length: f64,
    },
    /// `#s` or `bpm#s`: an absolute length in seconds, optionally at its own tempo.
    Seconds {
        /// The tempo the seconds are measured against, the current one if absent.
        bpm: Option<f64>,
        /// The length in seconds.
        seconds: f64,
    },
    /// `w##t`: a slide's wait and travel times, both in seconds.
    WaitTravel {
        /// Seconds between the star and the start of the slide movement.
        wait: f64,
        /// Seconds the slide movement lasts.
        travel: f64,
    },
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationError::InvalidDurationFormat {
            expr: expr.to_string(),
        };
        let non_negative = |text: &str| {
            parse_number(text)
                .filter(|value| *value >= 0.0)
                .ok_or_else(invalid)
        };
        if let Some((wait, travel)) = expr.split_once("##") {
            return Ok(Self::WaitTravel {
                wait: non_negative(wait)?,
                travel: non_negative(travel)?,
            });
        }
        if let Some((bpm, seconds)) = expr.split_once('#') {
            let bpm = if bpm.trim().is_empty() {
                None
            } else {
                let bpm = parse_number(bpm).filter(|bpm| *bpm > 0.0).ok_or_else(|| {
                    DurationError::InvalidBpm {
                        expr: expr.to_string(),
                    }
                })?;
                Some(bpm)
            };
            return Ok(Self::Seconds {
                bpm,
                seconds: non_negative(seconds)?,
            });
        }
        if let Some((divisor, length)) = expr.split_once(':') {
            let divisor = parse_number(divisor)
                .filter(|divisor| *divisor > 0.0)
                .ok_or_else(invalid)?;
            return Ok(Self::Ratio {
                divisor,
                length: non_negative(length)?,
            });
        }
        parse_number(expr)
            .filter(|divisor| *divisor > 0.0)
            .map(Self::Divisor)
            .ok_or_else(invalid)
    }
}

impl Duration {
    /// Converts the duration into a grid count at the given resolution and tempo.
    ///
    /// For [`Duration::WaitTravel`] this is the travel part only.
    #[must_use]
    pub fn to_grids(self, grids_per_measure: u32, bpm: f64) -> f64 {
        let per_measure = f64::from(grids_per_measure);
        match self {
            Self::Divisor(divisor) => per_measure / divisor,
            Self::Ratio { divisor, length } => length / divisor * per_measure,
            Self::Seconds {
                bpm: own_bpm,
                seconds,
            } => seconds_to_grid(seconds, grids_per_measure, own_bpm.unwrap_or(bpm)),
            Self::WaitTravel { travel, .. } => seconds_to_grid(travel, grids_per_measure, bpm),
        }
    }

    /// Returns the wait and travel grid counts of a [`Duration::WaitTravel`].
    #[must_use]
    pub fn wait_travel_grids(self, grids_per_measure: u32, bpm: f64) -> Option<(f64, f64)> {
        match self {
            Self::WaitTravel { wait, travel } => Some((
                seconds_to_grid(wait, grids_per_measure, bpm),
                seconds_to_grid(travel, grids_per_measure, bpm),
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Divisor(divisor) => write!(f, "{divisor}"),
            Self::Ratio { divisor, length } => write!(f, "{divisor}:{length}"),
            Self::Seconds {
                bpm: Some(bpm),
                seconds,
            } => write!(f, "{bpm}#{seconds}"),
            Self::Seconds { bpm: None, seconds } => write!(f, "#{seconds}"),
            Self::WaitTravel { wait, travel } => write!(f, "{wait}##{travel}"),
        }
    }
}

/// Parses `expr` and converts it into a grid count.
///
/// # Errors
///
/// Returns [`DurationError`] when `expr` is not a duration expression.
pub fn grid_length(expr: &str, grids_per_measure: u32, bpm: f64) -> Result<f64, DurationError> {
    Ok(expr.parse::<Duration>()?.to_grids(grids_per_measure, bpm))
}

/// Converts seconds into grids: a beat is `60 / bpm` seconds and `grids_per_measure / 4` grids.
#[must_use]
pub fn seconds_to_grid(seconds: f64, grids_per_measure: u32, bpm: f64) -> f64 {
    let seconds_per_beat = 60.0 / bpm;
    let grids_per_beat = f64::from(grids_per_measure) / 4.0;
    seconds / seconds_per_beat * grids_per_beat
}

/// Converts grids into seconds, the inverse of [`seconds_to_grid`].
#[must_use]
pub fn grid_to_seconds(grids: f64, grids_per_measure: u32, bpm: f64) -> f64 {
    let seconds_per_beat = 60.0 / bpm;
    let grids_per_beat = f64::from(grids_per_measure) / 4.0;
    grids / grids_per_beat * seconds_per_beat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_overflowing_grid() {
        assert_eq!(GridTime::normalized(1, 400, 384), GridTime::new(2, 16));
        assert_eq!(GridTime::normalized(1, 768, 384), GridTime::new(3, 0));
        assert_eq!(GridTime::new(2, 48).absolute(384), 816);
        assert_eq!(GridTime::from_absolute(816, 384), GridTime::new(2, 48));
        assert_eq!(GridTime::new(1, 380).advanced(8, 384), GridTime::new(2, 4));
        assert!(GridTime::new(1, 383) < GridTime::new(2, 0));
    }

    #[test]
    fn converts_each_duration_form() {
        assert_eq!(grid_length("4", 384, 120.0), Ok(96.0));
        assert_eq!(grid_length("2:3", 384, 120.0), Ok(576.0));
        // One beat at 120 BPM lasts half a second.
        assert_eq!(grid_length("#0.5", 384, 120.0), Ok(96.0));
        assert_eq!(grid_length("60#1", 384, 120.0), Ok(96.0));
        assert_eq!(grid_length("1##0.5", 384, 120.0), Ok(96.0));
        assert_eq!(
            "1##0.5".parse::<Duration>().map(|d| d.wait_travel_grids(384, 120.0)),
            Ok(Some((192.0, 96.0)))
        );
    }

    #[test]
    fn tolerates_non_integral_divisions() {
        let seventh = grid_length("7", 384, 120.0).unwrap();
        assert!((seventh - 384.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_unknown_forms() {
        assert_eq!(
            grid_length("X", 384, 120.0),
            Err(DurationError::InvalidDurationFormat {
                expr: "X".to_string()
            })
        );
        assert_eq!(
            grid_length("0", 384, 120.0),
            Err(DurationError::InvalidDurationFormat {
                expr: "0".to_string()
            })
        );
        assert_eq!(
            grid_length("fast#2", 384, 120.0),
            Err(DurationError::InvalidBpm {
                expr: "fast#2".to_string()
            })
        );
    }

    #[test]
    fn seconds_round_trip() {
        let grids = seconds_to_grid(1.25, 384, 150.0);
        assert!((grid_to_seconds(grids, 384, 150.0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn display_matches_input_form() {
        for expr in ["4", "8:3", "#2.5", "160#2", "0.5##1.75"] {
            let duration: Duration = expr.parse().unwrap();
            assert_eq!(duration.to_string(), expr);
        }
    }
}
