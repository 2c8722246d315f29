//! Note counts and the maximum scores derived from them.
//!
//! Counting happens in two steps: a mutable [`NoteCounter`] is fed one note type at a time,
//! then [`NoteCounter::finalize`] computes every aggregate at once into an immutable
//! [`MusicStatistics`].

use itertools::Itertools;

use super::note::{Note, NoteType};

/// Base score of a tap-like note.
pub const TAP_SCORE: u64 = 500;
/// Base score of a hold.
pub const HOLD_SCORE: u64 = 1000;
/// Base score of a slide.
pub const SLIDE_SCORE: u64 = 1500;
/// Base score of a break, without its bonus.
pub const BREAK_SCORE: u64 = 2600;

/// How many notes of each type a chart has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteCounts {
    /// `TAP`
    pub tap: u32,
    /// `BREAK`
    pub break_note: u32,
    /// `HOLD`
    pub hold: u32,
    /// `STAR`
    pub star: u32,
    /// `BREAK_STAR`
    pub break_star: u32,
    /// `EX_TAP`
    pub ex_tap: u32,
    /// `EX_HOLD`
    pub ex_hold: u32,
    /// `EX_STAR`
    pub ex_star: u32,
    /// `TOUCH_TAP`
    pub touch_tap: u32,
    /// `TOUCH_HOLD`
    pub touch_hold: u32,
    /// `SLIDE`
    pub slide: u32,
}

impl NoteCounts {
    fn slot(&mut self, note_type: NoteType) -> &mut u32 {
        match note_type {
            NoteType::Tap => &mut self.tap,
            NoteType::Break => &mut self.break_note,
            NoteType::ExTap => &mut self.ex_tap,
            NoteType::Hold => &mut self.hold,
            NoteType::ExHold => &mut self.ex_hold,
            NoteType::Star => &mut self.star,
            NoteType::ExStar => &mut self.ex_star,
            NoteType::BreakStar => &mut self.break_star,
            NoteType::Slide => &mut self.slide,
            NoteType::TouchTap => &mut self.touch_tap,
            NoteType::TouchHold => &mut self.touch_hold,
        }
    }

    /// The count of one type.
    #[must_use]
    pub const fn get(&self, note_type: NoteType) -> u32 {
        match note_type {
            NoteType::Tap => self.tap,
            NoteType::Break => self.break_note,
            NoteType::ExTap => self.ex_tap,
            NoteType::Hold => self.hold,
            NoteType::ExHold => self.ex_hold,
            NoteType::Star => self.star,
            NoteType::ExStar => self.ex_star,
            NoteType::BreakStar => self.break_star,
            NoteType::Slide => self.slide,
            NoteType::TouchTap => self.touch_tap,
            NoteType::TouchHold => self.touch_hold,
        }
    }

    /// The sum of all eleven counters.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.tap
            + self.break_note
            + self.hold
            + self.star
            + self.break_star
            + self.ex_tap
            + self.ex_hold
            + self.ex_star
            + self.touch_tap
            + self.touch_hold
            + self.slide
    }
}

/// The accumulating half of the statistics engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCounter {
    counts: NoteCounts,
    each_pairs: u32,
}

impl NoteCounter {
    /// Creates a counter with every count at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one note of `note_type`.
    pub fn count(&mut self, note_type: NoteType) {
        *self.counts.slot(note_type) += 1;
    }

    /// Counts one each-pair.
    pub fn count_each_pair(&mut self) {
        self.each_pairs += 1;
    }

    /// The counts so far.
    #[must_use]
    pub const fn counts(&self) -> &NoteCounts {
        &self.counts
    }

    /// Computes every aggregate.
    #[must_use]
    pub fn finalize(self) -> MusicStatistics {
        let counts = self.counts;
        let grouped = GroupedCounts {
            tap: counts.tap + counts.star + counts.ex_tap + counts.ex_star + counts.touch_tap,
            hold: counts.hold + counts.ex_hold + counts.touch_hold,
            slide: counts.slide,
            break_note: counts.break_note + counts.break_star,
        };
        let judge = JudgeCounts {
            tap: grouped.tap + grouped.break_note,
            hold: grouped.hold,
            slide: grouped.slide,
            total: grouped.tap + grouped.break_note + grouped.hold + grouped.slide,
        };
        let max_score = MaxScores {
            tap: u64::from(grouped.tap) * TAP_SCORE,
            hold: u64::from(grouped.hold) * HOLD_SCORE,
            slide: u64::from(grouped.slide) * SLIDE_SCORE,
            break_note: u64::from(grouped.break_note) * BREAK_SCORE,
            total: u64::from(grouped.tap) * TAP_SCORE
                + u64::from(grouped.hold) * HOLD_SCORE
                + u64::from(grouped.slide) * SLIDE_SCORE
                + u64::from(grouped.break_note) * BREAK_SCORE,
        };
        let bonus_free = max_score.total - u64::from(grouped.break_note) * 100;
        let achievement = if bonus_free == 0 {
            0.0
        } else {
            max_score.total as f64 / bonus_free as f64
        };
        MusicStatistics {
            counts,
            total: counts.total(),
            each_pairs: self.each_pairs,
            grouped,
            judge,
            max_score,
            achievement,
        }
    }
}

/// Counts merged the way judgements group them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupedCounts {
    /// Taps, stars and touch taps, excluding breaks.
    pub tap: u32,
    /// Holds of every kind.
    pub hold: u32,
    /// Slides.
    pub slide: u32,
    /// Breaks and break stars.
    pub break_note: u32,
}

/// Counts by judgement kind, where breaks are judged as taps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgeCounts {
    /// Tap judgements.
    pub tap: u32,
    /// Hold judgements.
    pub hold: u32,
    /// Slide judgements.
    pub slide: u32,
    /// All judgements.
    pub total: u32,
}

/// The best possible score of each group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxScores {
    /// `500` per grouped tap.
    pub tap: u64,
    /// `1000` per grouped hold.
    pub hold: u64,
    /// `1500` per slide.
    pub slide: u64,
    /// `2600` per grouped break.
    pub break_note: u64,
    /// The sum of the above.
    pub total: u64,
}

/// The finalized statistics of a chart.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MusicStatistics {
    /// Per-type counts.
    pub counts: NoteCounts,
    /// The number of notes.
    pub total: u32,
    /// The number of time positions where two or more non-slide notes are hit together.
    pub each_pairs: u32,
    /// Grouped counts.
    pub grouped: GroupedCounts,
    /// Judgement counts.
    pub judge: JudgeCounts,
    /// Maximum scores.
    pub max_score: MaxScores,
    /// The achievement ceiling, `max_score.total / (max_score.total - 100 * grouped.break_note)`.
    pub achievement: f64,
}

impl MusicStatistics {
    /// Counts every note of a chart.
    #[must_use]
    pub fn from_notes(notes: &[Note]) -> Self {
        let mut counter = NoteCounter::new();
        for note in notes {
            counter.count(note.note_type());
        }
        let each_pairs = notes
            .iter()
            .filter(|note| note.note_type() != NoteType::Slide)
            .map(|note| note.time)
            .counts()
            .into_values()
            .filter(|&simultaneous| simultaneous >= 2)
            .count();
        for _ in 0..each_pairs {
            counter.count_each_pair();
        }
        counter.finalize()
    }
}
