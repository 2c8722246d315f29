//! The Simai notation.
//!
//! A Simai note stream is a comma separated list of items. Each item may start with a `(bpm)`
//! and a `{divisor}` prefix, followed by an each-group of simultaneous notes. Reading goes
//! through three phases:
//!
//! - [`lex`] splits the stream into items and their prefixes, keeping byte ranges.
//! - [`grammar`] turns one note of a group into a tagged [`grammar::RawNote`].
//! - [`build`] validates raw notes and folds the items into timed [`Note`]s.
//!
//! [`unparse`] goes the other way, and [`maidata`] handles the `&key=value` document around the
//! note streams.

pub mod build;
pub mod grammar;
pub mod lex;
pub mod maidata;
pub mod unparse;

use thiserror::Error;

use crate::{
    chart::{
        BpmChange, MusicNotesData, TimeSignature,
        mixin::SourceRangeMixin,
        note::Note,
        stats::MusicStatistics,
    },
    time::{DEFAULT_GRIDS_PER_MEASURE, DurationError, GridTime},
};

pub use self::unparse::render_notes;

/// Settings for reading and writing Simai.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimaiConfig {
    /// Grid resolution of the produced charts.
    pub grids_per_measure: u32,
    /// The tempo until the first `(bpm)` item.
    pub default_bpm: f64,
    /// The divisor until the first `{divisor}` item.
    pub default_divisor: u32,
    /// Grids between successive backtick-separated notes.
    pub pseudo_each_offset: u32,
}

impl Default for SimaiConfig {
    fn default() -> Self {
        Self {
            grids_per_measure: DEFAULT_GRIDS_PER_MEASURE,
            default_bpm: 120.0,
            default_divisor: 4,
            pseudo_each_offset: 4,
        }
    }
}

impl SimaiConfig {
    /// Sets the grid resolution.
    #[must_use]
    pub const fn with_grids_per_measure(mut self, grids_per_measure: u32) -> Self {
        self.grids_per_measure = grids_per_measure;
        self
    }

    /// Sets the initial tempo.
    #[must_use]
    pub const fn with_default_bpm(mut self, default_bpm: f64) -> Self {
        self.default_bpm = default_bpm;
        self
    }

    /// Sets the initial divisor.
    #[must_use]
    pub const fn with_default_divisor(mut self, default_divisor: u32) -> Self {
        self.default_divisor = default_divisor;
        self
    }

    /// Sets the pseudo-each offset.
    #[must_use]
    pub const fn with_pseudo_each_offset(mut self, pseudo_each_offset: u32) -> Self {
        self.pseudo_each_offset = pseudo_each_offset;
        self
    }
}

/// An error in a Simai note stream.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimaiError {
    /// A `{divisor}` prefix or a note length is not a duration expression.
    #[error(transparent)]
    InvalidDurationFormat(#[from] DurationError),
    /// A `(bpm)` prefix is not a positive number.
    #[error("invalid BPM `{token}`")]
    InvalidBpm {
        /// The text between the parentheses.
        token: String,
    },
    /// A note does not follow the note grammar or breaks one of its rules.
    #[error("invalid note `{token}`: {reason}")]
    InvalidNoteSyntax {
        /// The note as written.
        token: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A slide uses a shape glyph that does not exist.
    #[error("unknown slide notation `{0}`")]
    UnknownSlideNotation(String),
}

impl SimaiError {
    pub(crate) fn note(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidNoteSyntax {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// A [`SimaiError`] with the byte range of the item it was found in.
pub type SimaiErrorWithRange = SourceRangeMixin<SimaiError>;

pub(crate) type Result<T> = core::result::Result<T, SimaiError>;

/// The chart read from one note stream.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedNotes {
    /// Notes in time order, ties kept in writing order.
    pub notes: Vec<Note>,
    /// Tempo changes in writing order.
    pub bpms: Vec<BpmChange>,
    /// Always the single 4/4 meter at the start.
    pub time_signatures: Vec<TimeSignature>,
    /// Counts over `notes`.
    pub statistics: MusicStatistics,
    /// Where the cursor stopped after the last item.
    pub end: GridTime,
    /// The resolution the times are expressed in.
    pub grids_per_measure: u32,
}

impl ParsedNotes {
    /// Converts into a chart without level or designer.
    pub fn into_notes_data(self) -> MusicNotesData {
        MusicNotesData {
            grids_per_measure: self.grids_per_measure,
            notes: self.notes,
            bpms: self.bpms,
            time_signatures: self.time_signatures,
            statistics: self.statistics,
            ..MusicNotesData::default()
        }
    }
}

/// Reads a note stream such as the value of `&inote_5=`.
///
/// # Errors
///
/// Stops at the first invalid item and returns its error with the item's byte range.
pub fn parse_notes(
    source: &str,
    config: &SimaiConfig,
) -> core::result::Result<ParsedNotes, SimaiErrorWithRange> {
    let items = lex::split_items(source)?;
    build::fold_items(&items, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builders() {
        let config = SimaiConfig::default()
            .with_grids_per_measure(192)
            .with_default_bpm(150.0)
            .with_default_divisor(8)
            .with_pseudo_each_offset(2);
        assert_eq!(config.grids_per_measure, 192);
        assert_eq!(config.default_bpm, 150.0);
        assert_eq!(config.default_divisor, 8);
        assert_eq!(config.pseudo_each_offset, 2);
    }

    #[test]
    fn errors_display_their_token() {
        let error = SimaiError::note("X", "unexpected `X`");
        assert_eq!(error.to_string(), "invalid note `X`: unexpected `X`");
        let positioned = SourceRangeMixin::new(error, 0..1);
        assert_eq!(
            positioned.to_string(),
            "invalid note `X`: unexpected `X` at indices [0, 1)"
        );
    }
}
