//! The chart model shared by both notations.
//!
//! A chart is a flat list of [`note::Note`]s plus its tempo and meter changes, all placed on
//! the grid described in [`crate::time`]. [`MusicNotesData`] is one difficulty, and
//! [`MusicData`] bundles the song metadata with every difficulty it has.
//!
//! Neither notation is privileged here: the Simai reader and the MA2 reader both produce
//! these types, and both writers consume them.

use std::collections::BTreeMap;

use crate::time::{DEFAULT_GRIDS_PER_MEASURE, GridTime};

pub mod mixin;
pub mod note;
pub mod stats;

use self::{note::Note, stats::MusicStatistics};

/// A tempo change.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BpmChange {
    /// Where the new tempo starts.
    pub time: GridTime,
    /// Beats per minute.
    pub bpm: f64,
}

/// A meter change, `beat_length` beats of a `divisor`-th note each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    /// Where the new meter starts.
    pub time: GridTime,
    /// The note value of one beat.
    pub divisor: u32,
    /// Beats per measure.
    pub beat_length: u32,
}

impl TimeSignature {
    /// The 4/4 meter every Simai chart starts with.
    #[must_use]
    pub const fn common() -> Self {
        Self {
            time: GridTime::START,
            divisor: 4,
            beat_length: 4,
        }
    }
}

/// A difficulty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    /// Simai `1`. MA2 has no slot for it.
    Easy,
    /// Simai `2`, MA2 `00`.
    Basic,
    /// Simai `3`, MA2 `01`.
    Advanced,
    /// Simai `4`, MA2 `02`.
    Expert,
    /// Simai `5`, MA2 `03`.
    Master,
    /// Simai `6`, MA2 `04`.
    ReMaster,
    /// Simai `7`, MA2 `05`.
    Utage,
}

impl Difficulty {
    /// All difficulties, easiest first.
    pub const ALL: [Self; 7] = [
        Self::Easy,
        Self::Basic,
        Self::Advanced,
        Self::Expert,
        Self::Master,
        Self::ReMaster,
        Self::Utage,
    ];

    /// The `N` of `inote_N`, `lv_N` and `des_N`.
    #[must_use]
    pub const fn simai_index(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Basic => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
            Self::Master => 5,
            Self::ReMaster => 6,
            Self::Utage => 7,
        }
    }

    /// The difficulty of `inote_N`.
    #[must_use]
    pub const fn from_simai_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Easy),
            2 => Some(Self::Basic),
            3 => Some(Self::Advanced),
            4 => Some(Self::Expert),
            5 => Some(Self::Master),
            6 => Some(Self::ReMaster),
            7 => Some(Self::Utage),
            _ => None,
        }
    }

    /// The `Notes` slot and score file suffix in an MA2 package.
    #[must_use]
    pub const fn ma2_slot(self) -> Option<u8> {
        match self {
            Self::Easy => None,
            Self::Basic => Some(0),
            Self::Advanced => Some(1),
            Self::Expert => Some(2),
            Self::Master => Some(3),
            Self::ReMaster => Some(4),
            Self::Utage => Some(5),
        }
    }

    /// The difficulty stored in MA2 slot `slot`.
    #[must_use]
    pub const fn from_ma2_slot(slot: u8) -> Option<Self> {
        match slot {
            0 => Some(Self::Basic),
            1 => Some(Self::Advanced),
            2 => Some(Self::Expert),
            3 => Some(Self::Master),
            4 => Some(Self::ReMaster),
            5 => Some(Self::Utage),
            _ => None,
        }
    }
}

/// One difficulty of a song.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MusicNotesData {
    /// The displayed level, `12.5` meaning `12+`.
    pub level: Option<f64>,
    /// Who charted it.
    pub designer: Option<String>,
    /// The score file it was read from or is written to.
    pub file_path: Option<String>,
    /// The grid resolution of every time in this chart.
    pub grids_per_measure: u32,
    /// Notes sorted by time.
    pub notes: Vec<Note>,
    /// Tempo changes sorted by time.
    pub bpms: Vec<BpmChange>,
    /// Meter changes sorted by time.
    pub time_signatures: Vec<TimeSignature>,
    /// Counts and scores derived from `notes`.
    pub statistics: MusicStatistics,
}

impl Default for MusicNotesData {
    fn default() -> Self {
        Self {
            level: None,
            designer: None,
            file_path: None,
            grids_per_measure: DEFAULT_GRIDS_PER_MEASURE,
            notes: Vec::new(),
            bpms: Vec::new(),
            time_signatures: Vec::new(),
            statistics: MusicStatistics::default(),
        }
    }
}

impl MusicNotesData {
    /// Recomputes `statistics` from `notes`.
    pub fn refresh_statistics(&mut self) {
        self.statistics = MusicStatistics::from_notes(&self.notes);
    }
}

/// Media files that belong to a song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetPaths {
    /// The audio track.
    pub track: Option<String>,
    /// The background video.
    pub movie: Option<String>,
    /// The jacket image.
    pub jacket: Option<String>,
}

/// A song with all of its difficulties.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MusicData {
    /// The numeric music id used by MA2 packages.
    pub id: Option<u32>,
    /// The song title.
    pub title: String,
    /// The artist.
    pub artist: Option<String>,
    /// The genre.
    pub genre: Option<String>,
    /// The displayed tempo.
    pub bpm: Option<f64>,
    /// Seconds of audio before the first measure.
    pub offset: Option<f64>,
    /// Media files.
    pub assets: AssetPaths,
    /// Charts by difficulty.
    pub notes_data: BTreeMap<Difficulty, MusicNotesData>,
}
