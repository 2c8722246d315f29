//! Writes a chart back as a Simai note stream.
//!
//! Notes and tempo changes are grouped by absolute grid. The gap after each group becomes a
//! `{divisor}` and a number of commas, chosen with exact rational arithmetic so that reading
//! the stream again lands every group on the same grid.

use std::collections::BTreeMap;

use itertools::Itertools;
use num::rational::Ratio;

use super::SimaiConfig;
use crate::{
    chart::{
        MusicNotesData,
        note::{Button, Note, NoteKind, NoteType, Position, Slide, SlideType},
    },
    time::{GridTime, grid_to_seconds},
};

#[derive(Debug, Default)]
struct Group<'a> {
    bpm: Option<f64>,
    notes: Vec<&'a Note>,
}

/// Picks the `{divisor}` and comma count that span `gap` grids.
///
/// The current divisor is kept when `gap` is a whole number of its rests shorter than a measure.
/// Otherwise whole measures use `{1}`, and anything else reduces `grids_per_measure / gap`.
/// The divisor has no upper bound, so a gap of one grid gives `{grids_per_measure}`.
#[must_use]
pub fn choose_rest(gap: u64, current: u64, grids_per_measure: u32) -> (u64, u64) {
    let per_measure = u64::from(grids_per_measure);
    if gap == 0 {
        return (current, 0);
    }
    if current > 0 && (gap * current) % per_measure == 0 {
        let commas = gap * current / per_measure;
        if commas < current {
            return (current, commas);
        }
    }
    if gap % per_measure == 0 {
        return (1, gap / per_measure);
    }
    let ratio = Ratio::new(per_measure, gap);
    (*ratio.numer(), *ratio.denom())
}

/// Renders `[d:l]` for a length of `grids`.
fn ratio_length(grids: u32, grids_per_measure: u32) -> String {
    let ratio = Ratio::new(u64::from(grids), u64::from(grids_per_measure));
    format!("[{}:{}]", ratio.denom(), ratio.numer())
}

/// Whole measures to move a chart by so that its first note lands at or after
/// [`GridTime::START`].
fn lead_in_measures(notes: &[Note]) -> u32 {
    notes
        .iter()
        .map(|note| note.time.measure)
        .min()
        .map_or(0, |first| GridTime::START.measure.saturating_sub(first))
}

/// Renders the note stream of one chart, ending with `{1},` and `E`.
///
/// A chart with notes before measure 1 is moved later by whole measures, tempo changes
/// included. Tempo changes still ahead of the stream collapse into the tempo in effect at
/// its start.
#[must_use]
pub fn render_notes(data: &MusicNotesData, config: &SimaiConfig) -> String {
    let per_measure = data.grids_per_measure.max(1);
    let shift = u64::from(lead_in_measures(&data.notes)) * u64::from(per_measure);
    let start = GridTime::START.absolute(per_measure);
    let mut groups: BTreeMap<u64, Group<'_>> = BTreeMap::new();
    groups.entry(start).or_default();
    for change in data.bpms.iter().sorted_by_key(|change| change.time.absolute(per_measure)) {
        let at = (change.time.absolute(per_measure) + shift).max(start);
        groups.entry(at).or_default().bpm = Some(change.bpm);
    }
    for note in &data.notes {
        let at = note.time.absolute(per_measure) + shift;
        groups.entry(at).or_default().notes.push(note);
    }

    let mut out = String::new();
    let mut divisor = u64::from(config.default_divisor);
    let mut bpm = config.default_bpm;
    let mut iter = groups.iter().peekable();
    while let Some((&at, group)) = iter.next() {
        if let Some(change) = group.bpm {
            bpm = change;
            out.push('(');
            out.push_str(&change.to_string());
            out.push(')');
        }
        let next = iter.peek().map(|&(&next, _)| next);
        let commas = match next {
            Some(next) => {
                let (chosen, commas) = choose_rest(next - at, divisor, per_measure);
                if chosen != divisor {
                    out.push('{');
                    out.push_str(&chosen.to_string());
                    out.push('}');
                    divisor = chosen;
                }
                commas
            }
            None => {
                if divisor != 1 {
                    out.push_str("{1}");
                }
                1
            }
        };
        out.push_str(&render_group(&group.notes, per_measure, bpm));
        out.push_str(&",".repeat(commas as usize));
        match next {
            Some(next) if next / u64::from(per_measure) > at / u64::from(per_measure) => {
                out.push('\n');
            }
            Some(_) => {}
            None => out.push_str("\nE"),
        }
    }
    out
}

/// Renders one each-group, pairing every slide with its head note.
///
/// A slide's head is the first star at its button, or else the first ring tap there. Slides
/// without a head are merged per button behind a `?`.
fn render_group(notes: &[&Note], grids_per_measure: u32, bpm: f64) -> String {
    let mut slides_of_head: BTreeMap<usize, Vec<&Slide>> = BTreeMap::new();
    let mut headless: Vec<(Button, Vec<&Slide>)> = Vec::new();

    for note in notes {
        let (Some(slide), Some(start)) = (note.slide(), note.position.button()) else {
            continue;
        };
        let head = find_head(notes, note.position, NoteType::is_star)
            .or_else(|| find_head(notes, note.position, NoteType::is_ring_tap));
        match head {
            Some(head) => slides_of_head.entry(head).or_default().push(slide),
            None => match headless.iter_mut().find(|(button, _)| *button == start) {
                Some((_, slides)) => slides.push(slide),
                None => headless.push((start, vec![slide])),
            },
        }
    }

    let mut tokens = Vec::new();
    for (index, note) in notes.iter().enumerate() {
        if let Some(slides) = slides_of_head.get(&index) {
            let mut token = head_prefix(note, note.note_type().is_ring_tap());
            push_tails(&mut token, note.position, slides, grids_per_measure, bpm);
            tokens.push(token);
        } else if note.slide().is_some() {
            let Some(start) = note.position.button() else {
                continue;
            };
            let Some(at) = headless.iter().position(|(button, _)| *button == start) else {
                continue;
            };
            let (_, slides) = headless.remove(at);
            let mut token = format!("{start}?");
            push_tails(&mut token, note.position, &slides, grids_per_measure, bpm);
            tokens.push(token);
        } else {
            tokens.push(render_single(note, grids_per_measure));
        }
    }
    tokens.iter().join("/")
}

fn find_head(notes: &[&Note], position: Position, accepts: fn(NoteType) -> bool) -> Option<usize> {
    notes
        .iter()
        .position(|note| note.position == position && accepts(note.note_type()))
}

fn head_prefix(note: &Note, ring: bool) -> String {
    let mut token = note.position.to_string();
    let note_type = note.note_type();
    if note_type.is_break() {
        token.push('b');
    }
    if note_type.is_ex() {
        token.push('x');
    }
    if ring {
        token.push('@');
    }
    token
}

fn push_tails(
    token: &mut String,
    position: Position,
    slides: &[&Slide],
    grids_per_measure: u32,
    bpm: f64,
) {
    let Some(start) = position.button() else {
        return;
    };
    let tails = slides
        .iter()
        .map(|slide| slide_tail(start, slide, grids_per_measure, bpm))
        .join("*");
    token.push_str(&tails);
}

fn render_single(note: &Note, grids_per_measure: u32) -> String {
    let mut token = note.position.to_string();
    let length = |length: u32| {
        if length == 0 {
            String::new()
        } else {
            ratio_length(length, grids_per_measure)
        }
    };
    match note.kind {
        NoteKind::Tap => {}
        NoteKind::Break => token.push('b'),
        NoteKind::ExTap => token.push('x'),
        NoteKind::Star => token.push('$'),
        NoteKind::ExStar => token.push_str("x$"),
        NoteKind::BreakStar => token.push_str("b$"),
        NoteKind::Hold { length: grids } => {
            token.push('h');
            token.push_str(&length(grids));
        }
        NoteKind::ExHold { length: grids } => {
            token.push_str("hx");
            token.push_str(&length(grids));
        }
        NoteKind::TouchTap { firework } => {
            if firework {
                token.push('f');
            }
        }
        NoteKind::TouchHold {
            length: grids,
            firework,
        } => {
            if firework {
                token.push('f');
            }
            token.push('h');
            token.push_str(&length(grids));
        }
        NoteKind::Slide(_) => {}
    }
    token
}

fn slide_tail(start: Button, slide: &Slide, grids_per_measure: u32, bpm: f64) -> String {
    let reachable =
        |shift: fn(Button, u8) -> Button| (1..=3).any(|steps| shift(start, steps) == slide.end);
    let notation = match slide.shape {
        SlideType::Straight => "-".to_string(),
        SlideType::CurveL if reachable(Button::shift_left) => "^".to_string(),
        SlideType::CurveL => "<".to_string(),
        SlideType::CurveR if reachable(Button::shift_right) => "^".to_string(),
        SlideType::CurveR => ">".to_string(),
        SlideType::CenterRotationLeft => "p".to_string(),
        SlideType::CenterRotationRight => "q".to_string(),
        SlideType::LetterSLeft => "s".to_string(),
        SlideType::LetterSRight => "z".to_string(),
        SlideType::LetterV => "v".to_string(),
        SlideType::SideRotationL => "pp".to_string(),
        SlideType::SideRotationR => "qq".to_string(),
        SlideType::RefractiveL => format!("V{}", start.shift_left(2)),
        SlideType::RefractiveR => format!("V{}", start.shift_right(2)),
        SlideType::Fan => "w".to_string(),
    };
    let length = if u64::from(slide.wait) * 4 == u64::from(grids_per_measure) {
        ratio_length(slide.travel, grids_per_measure)
    } else {
        let wait = grid_to_seconds(f64::from(slide.wait), grids_per_measure, bpm);
        let travel = grid_to_seconds(f64::from(slide.travel), grids_per_measure, bpm);
        format!("[{wait}##{travel}]")
    };
    format!("{notation}{}{length}", slide.end)
}
