//! The MA2 notation.
//!
//! An MA2 package is a `Music.xml` metadata file, handled in [`metadata`], plus one score file
//! per difficulty. A score file is a list of tab separated rows, see [`command`] for the row
//! layout. [`parse_score`] reads a score and [`render_score`] writes one.

pub mod command;
pub mod metadata;
pub mod unparse;

use std::{collections::BTreeMap, ops::Range};

use thiserror::Error;

use self::command::{Ma2Command, parse_row};
use crate::{
    chart::{
        BpmChange, Difficulty, MusicNotesData, TimeSignature,
        mixin::{SourceRangeMixin, SourceRangeMixinExt},
        note::Note,
        stats::MusicStatistics,
    },
    time::{DEFAULT_GRIDS_PER_MEASURE, GridTime},
};

pub use self::unparse::render_score;

/// Settings for writing score files.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ma2Config {
    /// The second field of `VERSION`.
    pub version: String,
    /// The value of `FES_MODE`.
    pub fes_mode: u32,
    /// The value of `COMPATIBLE_CODE`.
    pub compatible_code: String,
    /// The tempo written when a chart has none.
    pub default_bpm: f64,
}

impl Default for Ma2Config {
    fn default() -> Self {
        Self {
            version: "1.03.00".to_string(),
            fes_mode: 0,
            compatible_code: "MA2".to_string(),
            default_bpm: 120.0,
        }
    }
}

impl Ma2Config {
    /// Sets the format version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the festival mode flag.
    #[must_use]
    pub const fn with_fes_mode(mut self, fes_mode: u32) -> Self {
        self.fes_mode = fes_mode;
        self
    }

    /// Sets the compatibility code.
    #[must_use]
    pub fn with_compatible_code(mut self, compatible_code: impl Into<String>) -> Self {
        self.compatible_code = compatible_code.into();
        self
    }

    /// Sets the fallback tempo.
    #[must_use]
    pub const fn with_default_bpm(mut self, default_bpm: f64) -> Self {
        self.default_bpm = default_bpm;
        self
    }
}

/// An error in a score file.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreError {
    /// A row has a missing or unreadable field.
    #[error("malformed score line `{line}`: {reason}")]
    MalformedScoreLine {
        /// The row as written.
        line: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A [`ScoreError`] with the byte range of its row.
pub type ScoreErrorWithRange = SourceRangeMixin<ScoreError>;

pub(crate) type ScoreResult<T> = core::result::Result<T, ScoreError>;

/// A score file read into the chart model.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ma2Score {
    /// Every row that is not a note, `BPM` or `MET`, by command. A repeated command keeps its
    /// last row.
    pub header: BTreeMap<String, Vec<String>>,
    /// The value of `RESOLUTION`.
    pub resolution: u32,
    /// Notes sorted by time, ties kept in file order.
    pub notes: Vec<Note>,
    /// Tempo changes in file order.
    pub bpms: Vec<BpmChange>,
    /// Meter changes in file order.
    pub time_signatures: Vec<TimeSignature>,
    /// Counts over `notes`.
    pub statistics: MusicStatistics,
}

impl Ma2Score {
    /// Converts into a chart without level or designer.
    pub fn into_notes_data(self) -> MusicNotesData {
        MusicNotesData {
            grids_per_measure: self.resolution,
            notes: self.notes,
            bpms: self.bpms,
            time_signatures: self.time_signatures,
            statistics: self.statistics,
            ..MusicNotesData::default()
        }
    }
}

/// Splits `source` into trimmed non-empty rows with their byte ranges.
fn rows(source: &str) -> impl Iterator<Item = (&str, Range<usize>)> {
    source.split('\n').scan(0, |offset, raw| {
        let start = *offset;
        *offset += raw.len() + 1;
        let leading = raw.len() - raw.trim_start().len();
        let row = raw.trim();
        let begin = start + leading;
        Some((row, begin..begin + row.len()))
    })
    .filter(|(row, _)| !row.is_empty())
}

/// Reads a score file.
///
/// Grids of `RESOLUTION` or more carry into the measure number, wherever the `RESOLUTION` row
/// is placed.
///
/// # Errors
///
/// Stops at the first malformed row and returns its error with the row's byte range.
pub fn parse_score(source: &str) -> Result<Ma2Score, ScoreErrorWithRange> {
    let mut header = BTreeMap::new();
    let mut notes = Vec::new();
    let mut bpms = Vec::new();
    let mut time_signatures = Vec::new();
    let mut resolution = DEFAULT_GRIDS_PER_MEASURE;

    for (row, range) in rows(source) {
        match parse_row(row).map_err(|err| err.into_wrapper_range(range.clone()))? {
            Ma2Command::Bpm(change) => bpms.push(change),
            Ma2Command::Met(signature) => time_signatures.push(signature),
            Ma2Command::Note(note) => notes.push(note),
            Ma2Command::Header { name, args } => {
                if name == "RESOLUTION" {
                    resolution = args
                        .first()
                        .and_then(|value| value.parse().ok())
                        .filter(|&value| value > 0)
                        .ok_or_else(|| {
                            ScoreError::MalformedScoreLine {
                                line: row.to_string(),
                                reason: "invalid resolution".to_string(),
                            }
                            .into_wrapper_range(range.clone())
                        })?;
                }
                header.insert(
                    name.into_owned(),
                    args.into_iter().map(|arg| arg.into_owned()).collect(),
                );
            }
        }
    }

    let normalize = |time: GridTime| {
        GridTime::normalized(time.measure, u64::from(time.grid), resolution)
    };
    for note in &mut notes {
        note.time = normalize(note.time);
    }
    for change in &mut bpms {
        change.time = normalize(change.time);
    }
    for signature in &mut time_signatures {
        signature.time = normalize(signature.time);
    }
    notes.sort_by_key(|note| note.time);
    let statistics = MusicStatistics::from_notes(&notes);
    Ok(Ma2Score {
        header,
        resolution,
        notes,
        bpms,
        time_signatures,
        statistics,
    })
}

/// The score file name of a difficulty, `None` for [`Difficulty::Easy`].
#[must_use]
pub fn score_file_name(id: u32, difficulty: Difficulty) -> Option<String> {
    difficulty
        .ma2_slot()
        .map(|slot| format!("{id:06}_0{slot}.ma2"))
}

/// The difficulty a score file name stands for, read from its `_0N` suffix.
#[must_use]
pub fn difficulty_from_file_name(file_name: &str) -> Option<Difficulty> {
    let stem = file_name.rsplit(['/', '\\']).next()?;
    let stem = stem
        .len()
        .checked_sub(4)
        .filter(|&at| stem.is_char_boundary(at) && stem[at..].eq_ignore_ascii_case(".ma2"))
        .map_or(stem, |at| &stem[..at]);
    let (_, suffix) = stem.rsplit_once('_')?;
    Difficulty::from_ma2_slot(suffix.parse().ok()?)
}
