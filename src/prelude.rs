//! Re-exports of the commonly used types.
//!
//! `use maichart::prelude::*;` brings in the chart model, both notations and the conversions.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{ToAriadne, emit_score_error, emit_simai_error};
pub use crate::{
    chart::{
        AssetPaths, BpmChange, Difficulty, MusicData, MusicNotesData, TimeSignature,
        mixin::{SourceRangeMixin, SourceRangeMixinExt},
        note::{
            Button, InvalidButton, Note, NoteKind, NoteType, Position, Slide, SlideType, TouchArea,
        },
        stats::{MusicStatistics, NoteCounter, NoteCounts},
    },
    convert::{ConvertError, Ma2Package, load_ma2, ma2_to_simai, simai_to_ma2},
    diagnostics::SimpleSource,
    ma2::{
        Ma2Config, Ma2Score, ScoreError, ScoreErrorWithRange,
        command::{Ma2Command, NoteCode, SlideCode},
        difficulty_from_file_name,
        metadata::{Ma2Metadata, Ma2NotesEntry, MetadataError, parse_metadata, render_metadata},
        parse_score, render_score, score_file_name,
    },
    simai::{
        ParsedNotes, SimaiConfig, SimaiError, SimaiErrorWithRange,
        maidata::{Maidata, MaidataError, parse_maidata, render_maidata},
        parse_notes, render_notes,
    },
    time::{DEFAULT_GRIDS_PER_MEASURE, Duration, DurationError, GridTime},
};
