//! Validates raw notes and folds the items of a note stream into a chart.

use super::{
    ParsedNotes, Result, SimaiConfig, SimaiError, SimaiErrorWithRange,
    grammar::{self, Decorator, RawNote, RawSlide, SlideNotation},
    lex::Item,
};
use crate::{
    chart::{
        BpmChange, TimeSignature,
        mixin::SourceRangeMixinExt,
        note::{Button, Note, NoteKind, Position, Slide, SlideType},
        stats::MusicStatistics,
    },
    time::{Duration, DurationError, GridTime},
};

/// Grid slack when deciding whether the cursor reached the next measure.
const MEASURE_EPSILON: f64 = 1e-6;

/// The reading position and the notes produced so far.
#[derive(Debug, Clone)]
struct Fold {
    measure: u32,
    grid: f64,
    bpm: f64,
    rest: f64,
    notes: Vec<Note>,
    bpms: Vec<BpmChange>,
}

/// What a note needs to know about where it is read.
#[derive(Debug, Clone, Copy)]
struct NoteContext {
    time: GridTime,
    bpm: f64,
    grids_per_measure: u32,
}

impl Fold {
    fn new(config: &SimaiConfig) -> Self {
        Self {
            measure: GridTime::START.measure,
            grid: 0.0,
            bpm: config.default_bpm,
            rest: f64::from(config.grids_per_measure) / f64::from(config.default_divisor.max(1)),
            notes: Vec::new(),
            bpms: Vec::new(),
        }
    }

    fn time(&self, offset: u64, grids_per_measure: u32) -> GridTime {
        GridTime::normalized(
            self.measure,
            self.grid.round() as u64 + offset,
            grids_per_measure,
        )
    }

    fn step(mut self, item: &Item, config: &SimaiConfig) -> Result<Self> {
        let per_measure = config.grids_per_measure;
        if let Some(token) = &item.bpm {
            let bpm = token
                .parse::<f64>()
                .ok()
                .filter(|bpm| bpm.is_finite() && *bpm > 0.0)
                .ok_or_else(|| SimaiError::InvalidBpm {
                    token: token.clone(),
                })?;
            self.bpm = bpm;
            self.bpms.push(BpmChange {
                time: self.time(0, per_measure),
                bpm,
            });
        }
        if let Some(expr) = &item.divisor {
            let duration: Duration = expr.parse()?;
            if matches!(duration, Duration::WaitTravel { .. }) {
                return Err(DurationError::InvalidDurationFormat { expr: expr.clone() }.into());
            }
            self.rest = duration.to_grids(per_measure, self.bpm);
        }
        let notes = parse_group(&item.group, &self, config)?;
        self.notes.extend(notes);

        let per_measure = f64::from(per_measure);
        self.grid += self.rest;
        while self.grid >= per_measure - MEASURE_EPSILON {
            self.grid -= per_measure;
            self.measure += 1;
        }
        self.grid = self.grid.max(0.0);
        Ok(self)
    }

    fn finish(mut self, config: &SimaiConfig) -> ParsedNotes {
        self.notes.sort_by_key(|note| note.time);
        let end = self.time(0, config.grids_per_measure);
        ParsedNotes {
            statistics: MusicStatistics::from_notes(&self.notes),
            notes: self.notes,
            bpms: self.bpms,
            time_signatures: vec![TimeSignature::common()],
            end,
            grids_per_measure: config.grids_per_measure,
        }
    }
}

/// Folds lexed items into a chart.
///
/// # Errors
///
/// Returns the first invalid item's error, positioned at the item.
pub fn fold_items(
    items: &[Item],
    config: &SimaiConfig,
) -> core::result::Result<ParsedNotes, SimaiErrorWithRange> {
    let fold = items.iter().try_fold(Fold::new(config), |fold, item| {
        fold.step(item, config)
            .map_err(|err| err.into_wrapper_range(item.range.clone()))
    })?;
    Ok(fold.finish(config))
}

fn is_digit_run(group: &str) -> bool {
    (2..=8).contains(&group.len()) && group.chars().all(|c| ('1'..='8').contains(&c))
}

fn parse_group(group: &str, fold: &Fold, config: &SimaiConfig) -> Result<Vec<Note>> {
    if group.is_empty() {
        return Ok(Vec::new());
    }
    let per_measure = config.grids_per_measure;
    let context = |pseudo_index: u64| NoteContext {
        time: fold.time(pseudo_index * u64::from(config.pseudo_each_offset), per_measure),
        bpm: fold.bpm,
        grids_per_measure: per_measure,
    };
    if is_digit_run(group) {
        let time = context(0).time;
        return Ok(group
            .chars()
            .filter_map(Button::from_char)
            .map(|button| Note::new(time, Position::Button(button), NoteKind::Tap))
            .collect());
    }

    let mut notes = Vec::new();
    let mut pseudo_index = 0;
    let mut entry_start = 0;
    let mut offset = 0;
    for (index, c) in group.char_indices().chain([(group.len(), '/')]) {
        if c != '/' && c != '`' {
            continue;
        }
        let entry = &group[entry_start..index];
        if entry.is_empty() {
            return Err(SimaiError::note(group, "empty note in each-group"));
        }
        notes.extend(parse_entry(entry, &context(offset))?);
        entry_start = index + c.len_utf8();
        if c == '`' {
            pseudo_index += 1;
            offset = pseudo_index;
        } else {
            offset = 0;
        }
    }
    Ok(notes)
}

fn parse_entry(token: &str, context: &NoteContext) -> Result<Vec<Note>> {
    let raw = grammar::parse_note(token)?;
    check_decorators(token, &raw)?;
    if raw.slides.is_empty() {
        if raw.continuation {
            return Err(SimaiError::note(token, "`*` must be followed by a slide"));
        }
        if raw.decorators.contains(Decorator::Hold) {
            return build_hold(token, &raw, context).map(|note| vec![note]);
        }
        return build_tap(token, &raw, context).map(|note| vec![note]);
    }
    build_slides(token, &raw, context)
}

fn check_decorators(token: &str, raw: &RawNote<'_>) -> Result<()> {
    let has = |decorator| raw.decorators.contains(decorator);
    if has(Decorator::Firework) {
        if raw.position != Position::CENTER {
            return Err(SimaiError::note(token, "firework requires the center sensor"));
        }
        if has(Decorator::Break) || has(Decorator::Ex) {
            return Err(SimaiError::note(token, "firework cannot be a break or EX note"));
        }
        if has(Decorator::ForceRing) || has(Decorator::ForceStar) {
            return Err(SimaiError::note(token, "firework cannot force a shape"));
        }
    }
    if has(Decorator::Break) {
        if has(Decorator::Ex) {
            return Err(SimaiError::note(token, "break cannot be EX"));
        }
        if raw.position.is_touch() {
            return Err(SimaiError::note(token, "touch notes cannot be breaks"));
        }
        if has(Decorator::NoStar) {
            return Err(SimaiError::note(token, "break cannot drop its star"));
        }
    }
    if has(Decorator::Ex) && raw.position.is_touch() {
        return Err(SimaiError::note(token, "touch notes cannot be EX"));
    }
    if has(Decorator::NoStar) && raw.slides.is_empty() {
        return Err(SimaiError::note(token, "`?` and `!` only apply to slides"));
    }
    Ok(())
}

fn build_hold(token: &str, raw: &RawNote<'_>, context: &NoteContext) -> Result<Note> {
    let has = |decorator| raw.decorators.contains(decorator);
    if has(Decorator::Break) {
        return Err(SimaiError::note(token, "holds cannot be breaks"));
    }
    if has(Decorator::ForceRing) || has(Decorator::ForceStar) {
        return Err(SimaiError::note(token, "holds cannot force a shape"));
    }
    if raw.position.is_touch() && raw.position != Position::CENTER {
        return Err(SimaiError::note(
            token,
            "holds start on a button or the center sensor",
        ));
    }
    let length = match raw.length {
        Some(expr) => {
            let duration: Duration = expr.parse()?;
            if matches!(duration, Duration::WaitTravel { .. }) {
                return Err(SimaiError::note(token, "holds cannot wait before starting"));
            }
            duration
                .to_grids(context.grids_per_measure, context.bpm)
                .round() as u32
        }
        None => 0,
    };
    let kind = if raw.position == Position::CENTER {
        NoteKind::TouchHold {
            length,
            firework: has(Decorator::Firework),
        }
    } else if has(Decorator::Ex) {
        NoteKind::ExHold { length }
    } else {
        NoteKind::Hold { length }
    };
    Ok(Note::new(context.time, raw.position, kind))
}

fn build_tap(token: &str, raw: &RawNote<'_>, context: &NoteContext) -> Result<Note> {
    let has = |decorator| raw.decorators.contains(decorator);
    if raw.length.is_some() {
        return Err(SimaiError::note(token, "taps cannot have a length"));
    }
    let kind = if raw.position.is_touch() {
        NoteKind::TouchTap {
            firework: has(Decorator::Firework),
        }
    } else if has(Decorator::ForceStar) {
        star_kind(has(Decorator::Break), has(Decorator::Ex))
    } else {
        ring_kind(has(Decorator::Break), has(Decorator::Ex))
    };
    Ok(Note::new(context.time, raw.position, kind))
}

const fn star_kind(is_break: bool, is_ex: bool) -> NoteKind {
    if is_break {
        NoteKind::BreakStar
    } else if is_ex {
        NoteKind::ExStar
    } else {
        NoteKind::Star
    }
}

const fn ring_kind(is_break: bool, is_ex: bool) -> NoteKind {
    if is_break {
        NoteKind::Break
    } else if is_ex {
        NoteKind::ExTap
    } else {
        NoteKind::Tap
    }
}

fn build_slides(token: &str, raw: &RawNote<'_>, context: &NoteContext) -> Result<Vec<Note>> {
    let has = |decorator| raw.decorators.contains(decorator);
    let Position::Button(start) = raw.position else {
        return Err(SimaiError::note(token, "slides start on a button"));
    };
    if has(Decorator::Hold) {
        return Err(SimaiError::note(token, "slides cannot be holds"));
    }
    if raw.length.is_some() {
        return Err(SimaiError::note(token, "length does not follow a slide"));
    }

    let mut notes = Vec::with_capacity(raw.slides.len() + 1);
    if !raw.continuation && raw.head_slide && !has(Decorator::NoStar) {
        let is_break = has(Decorator::Break);
        let is_ex = has(Decorator::Ex);
        let head = if has(Decorator::ForceRing) {
            ring_kind(is_break, is_ex)
        } else {
            star_kind(is_break, is_ex)
        };
        notes.push(Note::new(context.time, raw.position, head));
    }
    for segment in &raw.slides {
        let slide = build_slide(token, start, segment, context)?;
        notes.push(Note::new(context.time, raw.position, NoteKind::Slide(slide)));
    }
    Ok(notes)
}

fn build_slide(
    token: &str,
    start: Button,
    segment: &RawSlide<'_>,
    context: &NoteContext,
) -> Result<Slide> {
    let notation: SlideNotation = segment.notation.parse()?;
    let (end, shape) = match (notation, segment.ends.as_slice()) {
        (SlideNotation::Refractive, &[refract, end]) => {
            let shape = if start.shift_left(2) == refract {
                SlideType::RefractiveL
            } else if start.shift_right(2) == refract {
                SlideType::RefractiveR
            } else {
                return Err(SimaiError::note(
                    token,
                    "refract button must be two steps from the start",
                ));
            };
            (end, shape)
        }
        (SlideNotation::Refractive, _) => {
            return Err(SimaiError::note(
                token,
                "`V` takes a refract button and an end button",
            ));
        }
        (_, &[end]) => (end, shape_of(notation, start, end)),
        (_, _) => {
            return Err(SimaiError::note(token, "only `V` takes two end buttons"));
        }
    };

    let distance = start.distance(end);
    let needs_distinct_end = matches!(
        notation,
        SlideNotation::Straight
            | SlideNotation::Curve
            | SlideNotation::LetterV
            | SlideNotation::Refractive
            | SlideNotation::LetterS
            | SlideNotation::LetterZ
            | SlideNotation::Fan
    );
    if needs_distinct_end && distance == 0 {
        return Err(SimaiError::note(token, "slide ends where it starts"));
    }
    if notation == SlideNotation::Curve && distance == 4 {
        return Err(SimaiError::note(
            token,
            "`^` cannot reach the opposite button",
        ));
    }
    if matches!(
        notation,
        SlideNotation::LetterS | SlideNotation::LetterZ | SlideNotation::Fan
    ) && distance != 4
    {
        return Err(SimaiError::note(
            token,
            "`s`, `z` and `w` end on the opposite button",
        ));
    }

    let Some(expr) = segment.length else {
        return Err(SimaiError::note(token, "slide requires a length"));
    };
    let duration: Duration = expr.parse()?;
    let per_measure = context.grids_per_measure;
    let (wait, travel) = duration
        .wait_travel_grids(per_measure, context.bpm)
        .unwrap_or_else(|| {
            (
                f64::from(per_measure) / 4.0,
                duration.to_grids(per_measure, context.bpm),
            )
        });
    Ok(Slide {
        end,
        shape,
        wait: wait.round() as u32,
        travel: travel.round() as u32,
    })
}

fn shape_of(notation: SlideNotation, start: Button, end: Button) -> SlideType {
    match notation {
        SlideNotation::Straight => SlideType::Straight,
        SlideNotation::Curve => {
            if start.shift_left(start.distance(end)) == end {
                SlideType::CurveL
            } else {
                SlideType::CurveR
            }
        }
        SlideNotation::CurveLeft => SlideType::CurveL,
        SlideNotation::CurveRight => SlideType::CurveR,
        SlideNotation::CenterLeft => SlideType::CenterRotationLeft,
        SlideNotation::CenterRight => SlideType::CenterRotationRight,
        SlideNotation::SideLeft => SlideType::SideRotationL,
        SlideNotation::SideRight => SlideType::SideRotationR,
        SlideNotation::LetterS => SlideType::LetterSLeft,
        SlideNotation::LetterZ => SlideType::LetterSRight,
        SlideNotation::LetterV => SlideType::LetterV,
        SlideNotation::Refractive => SlideType::RefractiveL,
        SlideNotation::Fan => SlideType::Fan,
    }
}
