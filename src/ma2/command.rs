//! Rows of an MA2 score file.
//!
//! Every row is a three-letter command followed by tab separated fields. Note rows carry the
//! measure, the grid and a 0-based position, then fields that depend on the note kind:
//!
//! | Command | Fields after the position |
//! | --- | --- |
//! | `TAP` `BRK` `XTP` `STR` `BST` `XST` | none |
//! | `HLD` `XHO` | length |
//! | `TTP` | area, firework, size |
//! | `THO` | length, area, firework, size |
//! | slide codes | wait, travel, 0-based end |

use std::{borrow::Cow, str::FromStr};

use super::{ScoreError, ScoreResult};
use crate::{
    chart::{
        BpmChange, TimeSignature,
        note::{Button, Note, NoteKind, NoteType, Position, Slide, SlideType, TouchArea},
    },
    time::GridTime,
};

/// The size tag written for touch notes.
pub const DEFAULT_TOUCH_SIZE: &str = "M1";

/// The command of a note row other than a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteCode {
    /// `TAP`
    Tap,
    /// `HLD`
    Hold,
    /// `STR`
    Star,
    /// `BRK`
    Break,
    /// `BST`
    BreakStar,
    /// `TTP`
    TouchTap,
    /// `THO`
    TouchHold,
    /// `XTP`
    ExTap,
    /// `XHO`
    ExHold,
    /// `XST`
    ExStar,
}

impl NoteCode {
    /// The three-letter command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tap => "TAP",
            Self::Hold => "HLD",
            Self::Star => "STR",
            Self::Break => "BRK",
            Self::BreakStar => "BST",
            Self::TouchTap => "TTP",
            Self::TouchHold => "THO",
            Self::ExTap => "XTP",
            Self::ExHold => "XHO",
            Self::ExStar => "XST",
        }
    }

    /// The code of `note_type`, `None` for slides.
    #[must_use]
    pub const fn from_note_type(note_type: NoteType) -> Option<Self> {
        Some(match note_type {
            NoteType::Tap => Self::Tap,
            NoteType::Break => Self::Break,
            NoteType::ExTap => Self::ExTap,
            NoteType::Hold => Self::Hold,
            NoteType::ExHold => Self::ExHold,
            NoteType::Star => Self::Star,
            NoteType::ExStar => Self::ExStar,
            NoteType::BreakStar => Self::BreakStar,
            NoteType::TouchTap => Self::TouchTap,
            NoteType::TouchHold => Self::TouchHold,
            NoteType::Slide => return None,
        })
    }
}

impl From<NoteCode> for NoteType {
    fn from(code: NoteCode) -> Self {
        match code {
            NoteCode::Tap => Self::Tap,
            NoteCode::Hold => Self::Hold,
            NoteCode::Star => Self::Star,
            NoteCode::Break => Self::Break,
            NoteCode::BreakStar => Self::BreakStar,
            NoteCode::TouchTap => Self::TouchTap,
            NoteCode::TouchHold => Self::TouchHold,
            NoteCode::ExTap => Self::ExTap,
            NoteCode::ExHold => Self::ExHold,
            NoteCode::ExStar => Self::ExStar,
        }
    }
}

impl FromStr for NoteCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "TAP" => Self::Tap,
            "HLD" => Self::Hold,
            "STR" => Self::Star,
            "BRK" => Self::Break,
            "BST" => Self::BreakStar,
            "TTP" => Self::TouchTap,
            "THO" => Self::TouchHold,
            "XTP" => Self::ExTap,
            "XHO" => Self::ExHold,
            "XST" => Self::ExStar,
            _ => return Err(()),
        })
    }
}

impl std::fmt::Display for NoteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The command of a slide row, one per [`SlideType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlideCode(pub SlideType);

impl SlideCode {
    /// The three-letter command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self.0 {
            SlideType::Straight => "SI_",
            SlideType::CurveL => "SCL",
            SlideType::CurveR => "SCR",
            SlideType::CenterRotationLeft => "SUL",
            SlideType::CenterRotationRight => "SUR",
            SlideType::LetterSLeft => "SSL",
            SlideType::LetterSRight => "SSR",
            SlideType::LetterV => "SV_",
            SlideType::SideRotationL => "SXL",
            SlideType::SideRotationR => "SXR",
            SlideType::RefractiveL => "SLL",
            SlideType::RefractiveR => "SLR",
            SlideType::Fan => "SF_",
        }
    }
}

impl FromStr for SlideCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(match s {
            "SI_" => SlideType::Straight,
            "SCL" => SlideType::CurveL,
            "SCR" => SlideType::CurveR,
            "SUL" => SlideType::CenterRotationLeft,
            "SUR" => SlideType::CenterRotationRight,
            "SSL" => SlideType::LetterSLeft,
            "SSR" => SlideType::LetterSRight,
            "SV_" => SlideType::LetterV,
            "SXL" => SlideType::SideRotationL,
            "SXR" => SlideType::SideRotationR,
            "SLL" => SlideType::RefractiveL,
            "SLR" => SlideType::RefractiveR,
            "SF_" => SlideType::Fan,
            _ => return Err(()),
        }))
    }
}

impl std::fmt::Display for SlideCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a score file.
#[derive(Debug, Clone, PartialEq)]
pub enum Ma2Command<'a> {
    /// `BPM measure grid bpm`
    Bpm(BpmChange),
    /// `MET measure grid beat_length divisor`
    Met(TimeSignature),
    /// A note row.
    Note(Note),
    /// Any other row, kept as text.
    Header {
        /// The command.
        name: Cow<'a, str>,
        /// The fields after the command.
        args: Vec<Cow<'a, str>>,
    },
}

struct RowReader<'a, I> {
    line: &'a str,
    fields: I,
}

impl<'a, I: Iterator<Item = &'a str>> RowReader<'a, I> {
    fn malformed(&self, reason: impl Into<String>) -> ScoreError {
        ScoreError::MalformedScoreLine {
            line: self.line.to_string(),
            reason: reason.into(),
        }
    }

    fn next<T: FromStr>(&mut self, what: &str) -> ScoreResult<T> {
        let field = self
            .fields
            .next()
            .ok_or_else(|| self.malformed(format!("missing {what}")))?;
        field
            .parse()
            .map_err(|_| self.malformed(format!("invalid {what} `{field}`")))
    }

    fn time(&mut self) -> ScoreResult<GridTime> {
        Ok(GridTime::new(self.next("measure")?, self.next("grid")?))
    }

    fn button(&mut self, what: &str) -> ScoreResult<Button> {
        let index: u8 = self.next(what)?;
        Button::from_index(index)
            .ok_or_else(|| self.malformed(format!("{what} {index} out of range")))
    }

    fn touch(&mut self, index: u8) -> ScoreResult<(Position, bool)> {
        let area: char = self.next("touch area")?;
        let area = TouchArea::from_char(area)
            .ok_or_else(|| self.malformed(format!("unknown touch area `{area}`")))?;
        let firework = self.fields.next() == Some("1");
        let position = if area == TouchArea::C {
            Position::CENTER
        } else {
            Button::from_index(index)
                .and_then(|button| Position::touch(area, Some(button)))
                .ok_or_else(|| self.malformed(format!("touch index {index} out of range")))?
        };
        Ok((position, firework))
    }
}

/// Reads one trimmed, non-empty row.
///
/// # Errors
///
/// Returns [`ScoreError::MalformedScoreLine`] when a note, `BPM` or `MET` row has a missing
/// or non-numeric field, a `BPM` row has a tempo that is not a positive number, or a `MET` row
/// has a zero field.
pub fn parse_row(line: &str) -> ScoreResult<Ma2Command<'_>> {
    let mut fields = line.split(['\t', ' ']).filter(|field| !field.is_empty());
    let name = fields.next().unwrap_or_default();
    let mut row = RowReader { line, fields };
    let command = match name {
        "BPM" => {
            let time = row.time()?;
            let bpm: f64 = row.next("bpm")?;
            if !bpm.is_finite() || bpm <= 0.0 {
                return Err(row.malformed(format!("bpm {bpm} is not positive")));
            }
            Ma2Command::Bpm(BpmChange { time, bpm })
        }
        "MET" => {
            let time = row.time()?;
            let beat_length = row.next("beat length")?;
            let divisor = row.next("divisor")?;
            if beat_length == 0 || divisor == 0 {
                return Err(row.malformed("meter of zero"));
            }
            Ma2Command::Met(TimeSignature {
                time,
                divisor,
                beat_length,
            })
        }
        _ => {
            if let Ok(code) = name.parse::<NoteCode>() {
                Ma2Command::Note(parse_note(code, &mut row)?)
            } else if let Ok(SlideCode(shape)) = name.parse::<SlideCode>() {
                let time = row.time()?;
                let start = row.button("position")?;
                let wait = row.next("wait")?;
                let travel = row.next("travel")?;
                let end = row.button("end position")?;
                Ma2Command::Note(Note::new(
                    time,
                    Position::Button(start),
                    NoteKind::Slide(Slide {
                        end,
                        shape,
                        wait,
                        travel,
                    }),
                ))
            } else {
                Ma2Command::Header {
                    name: Cow::Borrowed(name),
                    args: row.fields.map(Cow::Borrowed).collect(),
                }
            }
        }
    };
    Ok(command)
}

fn parse_note<'a, I: Iterator<Item = &'a str>>(
    code: NoteCode,
    row: &mut RowReader<'a, I>,
) -> ScoreResult<Note> {
    let time = row.time()?;
    let note = match code {
        NoteCode::TouchTap => {
            let index = row.next("position")?;
            let (position, firework) = row.touch(index)?;
            Note::new(time, position, NoteKind::TouchTap { firework })
        }
        NoteCode::TouchHold => {
            let index = row.next("position")?;
            let length = row.next("hold length")?;
            let (position, firework) = row.touch(index)?;
            Note::new(time, position, NoteKind::TouchHold { length, firework })
        }
        NoteCode::Hold | NoteCode::ExHold => {
            let position = Position::Button(row.button("position")?);
            let length = row.next("hold length")?;
            let kind = if code == NoteCode::Hold {
                NoteKind::Hold { length }
            } else {
                NoteKind::ExHold { length }
            };
            Note::new(time, position, kind)
        }
        NoteCode::Tap
        | NoteCode::Break
        | NoteCode::ExTap
        | NoteCode::Star
        | NoteCode::BreakStar
        | NoteCode::ExStar => {
            let position = Position::Button(row.button("position")?);
            let kind = match code {
                NoteCode::Break => NoteKind::Break,
                NoteCode::ExTap => NoteKind::ExTap,
                NoteCode::Star => NoteKind::Star,
                NoteCode::BreakStar => NoteKind::BreakStar,
                NoteCode::ExStar => NoteKind::ExStar,
                _ => NoteKind::Tap,
            };
            Note::new(time, position, kind)
        }
    };
    Ok(note)
}

fn write_fields(f: &mut std::fmt::Formatter<'_>, fields: &[String]) -> std::fmt::Result {
    f.write_str(&fields.join("\t"))
}

impl std::fmt::Display for Ma2Command<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bpm(change) => write!(
                f,
                "BPM\t{}\t{}\t{:.3}",
                change.time.measure, change.time.grid, change.bpm
            ),
            Self::Met(signature) => write!(
                f,
                "MET\t{}\t{}\t{}\t{}",
                signature.time.measure,
                signature.time.grid,
                signature.beat_length,
                signature.divisor
            ),
            Self::Note(note) => write_fields(f, &note_fields(note)),
            Self::Header { name, args } => {
                let mut fields = vec![name.to_string()];
                fields.extend(args.iter().map(ToString::to_string));
                write_fields(f, &fields)
            }
        }
    }
}

fn note_fields(note: &Note) -> Vec<String> {
    let position = note.position.index().map_or(0, Button::index);
    let code = match note.kind {
        NoteKind::Slide(slide) => SlideCode(slide.shape).to_string(),
        _ => NoteCode::from_note_type(note.note_type())
            .map_or_else(String::new, |code| code.as_str().to_string()),
    };
    let mut fields = vec![
        code,
        note.time.measure.to_string(),
        note.time.grid.to_string(),
        position.to_string(),
    ];
    let touch = |fields: &mut Vec<String>, firework: bool| {
        fields.push(note.position.area().to_string());
        fields.push(if firework { "1" } else { "0" }.to_string());
        fields.push(DEFAULT_TOUCH_SIZE.to_string());
    };
    match note.kind {
        NoteKind::Hold { length } | NoteKind::ExHold { length } => {
            fields.push(length.to_string());
        }
        NoteKind::TouchTap { firework } => touch(&mut fields, firework),
        NoteKind::TouchHold { length, firework } => {
            fields.push(length.to_string());
            touch(&mut fields, firework);
        }
        NoteKind::Slide(slide) => {
            fields.push(slide.wait.to_string());
            fields.push(slide.travel.to_string());
            fields.push(slide.end.index().to_string());
        }
        _ => {}
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(number: u8) -> Button {
        Button::new(number).unwrap()
    }

    #[test]
    fn positions_are_zero_based_on_disk() {
        let Ma2Command::Note(note) = parse_row("TAP\t2\t0\t7").unwrap() else {
            panic!("expected a note row");
        };
        assert_eq!(note.time, GridTime::new(2, 0));
        assert_eq!(note.position, Position::Button(button(8)));
        assert_eq!(Ma2Command::Note(note).to_string(), "TAP\t2\t0\t7");
    }

    #[test]
    fn slide_end_is_zero_based_too() {
        let row = "SCL\t1\t96\t1\t96\t48\t6";
        let Ma2Command::Note(note) = parse_row(row).unwrap() else {
            panic!("expected a slide row");
        };
        assert_eq!(
            note.slide(),
            Some(&Slide {
                end: button(7),
                shape: SlideType::CurveL,
                wait: 96,
                travel: 48,
            })
        );
        assert_eq!(Ma2Command::Note(note).to_string(), row);
    }

    #[test]
    fn touch_rows() {
        let Ma2Command::Note(note) = parse_row("THO\t3\t0\t0\t192\tC\t1\tM1").unwrap() else {
            panic!("expected a touch hold row");
        };
        assert_eq!(note.position, Position::CENTER);
        assert_eq!(
            note.kind,
            NoteKind::TouchHold {
                length: 192,
                firework: true
            }
        );
        let Ma2Command::Note(note) = parse_row("TTP    1   0   2   B   0   M1").unwrap() else {
            panic!("expected a touch row");
        };
        assert_eq!(
            note.position,
            Position::touch(TouchArea::B, Some(button(3))).unwrap()
        );
        assert_eq!(
            Ma2Command::Note(note).to_string(),
            "TTP\t1\t0\t2\tB\t0\tM1"
        );
    }

    #[test]
    fn header_and_tempo_rows() {
        assert_eq!(
            parse_row("RESOLUTION\t384").unwrap(),
            Ma2Command::Header {
                name: Cow::Borrowed("RESOLUTION"),
                args: vec![Cow::Borrowed("384")]
            }
        );
        let bpm = parse_row("BPM\t1\t0\t150.5").unwrap();
        assert_eq!(bpm.to_string(), "BPM\t1\t0\t150.500");
        let met = parse_row("MET\t0\t0\t3\t4").unwrap();
        assert_eq!(
            met,
            Ma2Command::Met(TimeSignature {
                time: GridTime::new(0, 0),
                divisor: 4,
                beat_length: 3,
            })
        );
    }

    #[test]
    fn malformed_rows() {
        for row in [
            "TAP\t1\tx\t0",
            "HLD\t1\t0\t0",
            "TAP\t1\t0\t8",
            "BPM\t1\t0",
            "TTP\t1\t0\t0\tQ",
            "BPM\t0\t0\tNaN",
            "BPM\t0\t0\tinf",
            "BPM\t1\t0\t-5",
            "BPM\t1\t0\t0",
            "MET\t0\t0\t0\t4",
            "MET\t0\t0\t4\t0",
        ] {
            assert!(
                matches!(
                    parse_row(row),
                    Err(ScoreError::MalformedScoreLine { line, .. }) if line == row
                ),
                "{row} should be malformed"
            );
        }
    }

    #[test]
    fn codes_cover_every_type() {
        for code in ["TAP", "HLD", "STR", "BRK", "BST", "TTP", "THO", "XTP", "XHO", "XST"] {
            let parsed: NoteCode = code.parse().unwrap();
            assert_eq!(parsed.to_string(), code);
            assert_eq!(NoteCode::from_note_type(parsed.into()), Some(parsed));
        }
        assert_eq!(NoteCode::from_note_type(NoteType::Slide), None);
        for code in [
            "SI_", "SCL", "SCR", "SUL", "SUR", "SSL", "SSR", "SV_", "SXL", "SXR", "SLL", "SLR", "SF_",
        ] {
            let parsed: SlideCode = code.parse().unwrap();
            assert_eq!(parsed.to_string(), code);
        }
        assert_eq!("SLD".parse::<SlideCode>(), Err(()));
    }
}
