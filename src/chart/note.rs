//! Positions and notes.

use thiserror::Error;

use crate::time::GridTime;

/// One of the eight ring buttons, numbered clockwise from 1 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Button(u8);

/// A button number outside `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("button number {0} is not in 1..=8")]
pub struct InvalidButton(pub u8);

impl TryFrom<u8> for Button {
    type Error = InvalidButton;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number).ok_or(InvalidButton(number))
    }
}

impl From<Button> for u8 {
    fn from(button: Button) -> Self {
        button.get()
    }
}

impl Button {
    /// Creates a button from its number, `1..=8`.
    #[must_use]
    pub const fn new(number: u8) -> Option<Self> {
        if matches!(number, 1..=8) {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Creates a button from a digit character `'1'..='8'`.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|digit| Self::new(digit as u8))
    }

    /// Creates a button from a 0-based index `0..=7`.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 { Some(Self(index + 1)) } else { None }
    }

    /// The button number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The 0-based index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0 - 1
    }

    /// Walks `steps` buttons towards lower numbers, wrapping from 1 to 8.
    #[must_use]
    pub const fn shift_left(self, steps: u8) -> Self {
        Self((self.0 - 1 + 8 - steps % 8) % 8 + 1)
    }

    /// Walks `steps` buttons towards higher numbers, wrapping from 8 to 1.
    #[must_use]
    pub const fn shift_right(self, steps: u8) -> Self {
        Self((self.0 - 1 + steps % 8) % 8 + 1)
    }

    /// The number of steps along the shorter way around the ring, `0..=4`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u8 {
        let diff = self.0.abs_diff(other.0);
        if diff <= 8 - diff { diff } else { 8 - diff }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A region of the touch panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TouchArea {
    /// The outer ring, in front of the buttons.
    A,
    /// The inner ring.
    B,
    /// The center.
    C,
    /// The outer ring, between the buttons.
    D,
    /// The inner ring, between the B sensors.
    E,
}

impl TouchArea {
    /// Reads an area letter.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            _ => None,
        }
    }

    /// The area letter.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }
}

impl std::fmt::Display for TouchArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Where a note is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    /// A ring button, which belongs to area A.
    Button(Button),
    /// A touch sensor. Only `C` has no index.
    Touch {
        /// The sensor region.
        area: TouchArea,
        /// The sensor number inside the region, `None` for `C`.
        index: Option<Button>,
    },
}

impl Position {
    /// The center sensor.
    pub const CENTER: Self = Self::Touch {
        area: TouchArea::C,
        index: None,
    };

    /// Creates a touch position, rejecting `C` with an index and other areas without one.
    #[must_use]
    pub const fn touch(area: TouchArea, index: Option<Button>) -> Option<Self> {
        match (area, index) {
            (TouchArea::C, None) => Some(Self::CENTER),
            (TouchArea::C, Some(_)) | (_, None) => None,
            (area, Some(index)) => Some(Self::Touch {
                area,
                index: Some(index),
            }),
        }
    }

    /// The area, [`TouchArea::A`] for buttons.
    #[must_use]
    pub const fn area(self) -> TouchArea {
        match self {
            Self::Button(_) => TouchArea::A,
            Self::Touch { area, .. } => area,
        }
    }

    /// The button or sensor number, `None` for the center.
    #[must_use]
    pub const fn index(self) -> Option<Button> {
        match self {
            Self::Button(button) => Some(button),
            Self::Touch { index, .. } => index,
        }
    }

    /// The ring button, `None` for touch sensors.
    #[must_use]
    pub const fn button(self) -> Option<Button> {
        match self {
            Self::Button(button) => Some(button),
            Self::Touch { .. } => None,
        }
    }

    /// Whether this is a touch sensor.
    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::Touch { .. })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Button(button) => write!(f, "{button}"),
            Self::Touch {
                area,
                index: Some(index),
            } => write!(f, "{area}{index}"),
            Self::Touch { area, index: None } => write!(f, "{area}"),
        }
    }
}

/// The kind of a note without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteType {
    /// A ring tap.
    Tap,
    /// A break tap.
    Break,
    /// An EX tap.
    ExTap,
    /// A hold.
    Hold,
    /// An EX hold.
    ExHold,
    /// A star, the head of a slide or a star-shaped tap.
    Star,
    /// An EX star.
    ExStar,
    /// A break star.
    BreakStar,
    /// A slide movement.
    Slide,
    /// A touch sensor tap.
    TouchTap,
    /// A touch sensor hold.
    TouchHold,
}

impl NoteType {
    /// Whether the note is a star (a slide head).
    #[must_use]
    pub const fn is_star(self) -> bool {
        matches!(self, Self::Star | Self::ExStar | Self::BreakStar)
    }

    /// Whether the note is a round ring tap.
    #[must_use]
    pub const fn is_ring_tap(self) -> bool {
        matches!(self, Self::Tap | Self::Break | Self::ExTap)
    }

    /// Whether the note carries a hold length.
    #[must_use]
    pub const fn is_hold(self) -> bool {
        matches!(self, Self::Hold | Self::ExHold | Self::TouchHold)
    }

    /// Whether the note is a break.
    #[must_use]
    pub const fn is_break(self) -> bool {
        matches!(self, Self::Break | Self::BreakStar)
    }

    /// Whether the note is an EX note.
    #[must_use]
    pub const fn is_ex(self) -> bool {
        matches!(self, Self::ExTap | Self::ExHold | Self::ExStar)
    }
}

/// The path a slide takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlideType {
    /// A straight line.
    Straight,
    /// Along the ring, towards lower button numbers.
    CurveL,
    /// Along the ring, towards higher button numbers.
    CurveR,
    /// Around the center, counterclockwise.
    CenterRotationLeft,
    /// Around the center, clockwise.
    CenterRotationRight,
    /// An S shape.
    LetterSLeft,
    /// A Z shape.
    LetterSRight,
    /// Into the center and out again.
    LetterV,
    /// A loop along the side, counterclockwise.
    SideRotationL,
    /// A loop along the side, clockwise.
    SideRotationR,
    /// A V shape bending at the button two steps to the left.
    RefractiveL,
    /// A V shape bending at the button two steps to the right.
    RefractiveR,
    /// Three straight lines fanning out to the opposite side.
    Fan,
}

/// A slide movement starting at the note's button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slide {
    /// The button where the slide ends.
    pub end: Button,
    /// The path shape.
    pub shape: SlideType,
    /// Grids between the star and the start of the movement.
    pub wait: u32,
    /// Grids the movement lasts.
    pub travel: u32,
}

/// The kind of a note together with the fields that only that kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteKind {
    /// A ring tap.
    Tap,
    /// A break tap.
    Break,
    /// An EX tap.
    ExTap,
    /// A star.
    Star,
    /// An EX star.
    ExStar,
    /// A break star.
    BreakStar,
    /// A hold of `length` grids.
    Hold {
        /// Hold length in grids.
        length: u32,
    },
    /// An EX hold of `length` grids.
    ExHold {
        /// Hold length in grids.
        length: u32,
    },
    /// A touch tap. `firework` is only ever set on the center sensor.
    TouchTap {
        /// Whether hitting it launches a firework.
        firework: bool,
    },
    /// A touch hold on the center sensor.
    TouchHold {
        /// Hold length in grids.
        length: u32,
        /// Whether finishing it launches a firework.
        firework: bool,
    },
    /// A slide movement.
    Slide(Slide),
}

impl NoteKind {
    /// The payload-free type.
    #[must_use]
    pub const fn note_type(&self) -> NoteType {
        match self {
            Self::Tap => NoteType::Tap,
            Self::Break => NoteType::Break,
            Self::ExTap => NoteType::ExTap,
            Self::Star => NoteType::Star,
            Self::ExStar => NoteType::ExStar,
            Self::BreakStar => NoteType::BreakStar,
            Self::Hold { .. } => NoteType::Hold,
            Self::ExHold { .. } => NoteType::ExHold,
            Self::TouchTap { .. } => NoteType::TouchTap,
            Self::TouchHold { .. } => NoteType::TouchHold,
            Self::Slide(_) => NoteType::Slide,
        }
    }

    /// The hold length of hold kinds.
    #[must_use]
    pub const fn hold_length(&self) -> Option<u32> {
        match self {
            Self::Hold { length } | Self::ExHold { length } | Self::TouchHold { length, .. } => {
                Some(*length)
            }
            _ => None,
        }
    }

    /// Whether the note has the firework flag.
    #[must_use]
    pub const fn firework(&self) -> bool {
        match self {
            Self::TouchTap { firework } | Self::TouchHold { firework, .. } => *firework,
            _ => false,
        }
    }
}

/// A timed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    /// When the note is hit.
    pub time: GridTime,
    /// Where the note is placed. Slides start at [`Position::Button`].
    pub position: Position,
    /// What the note is.
    pub kind: NoteKind,
}

impl Note {
    /// Creates a note.
    #[must_use]
    pub const fn new(time: GridTime, position: Position, kind: NoteKind) -> Self {
        Self {
            time,
            position,
            kind,
        }
    }

    /// The payload-free type.
    #[must_use]
    pub const fn note_type(&self) -> NoteType {
        self.kind.note_type()
    }

    /// The slide payload, if this is a slide.
    #[must_use]
    pub const fn slide(&self) -> Option<&Slide> {
        match &self.kind {
            NoteKind::Slide(slide) => Some(slide),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(number: u8) -> Button {
        Button::new(number).unwrap()
    }

    #[test]
    fn button_numbers_are_checked() {
        assert_eq!(Button::try_from(8), Ok(button(8)));
        assert_eq!(Button::try_from(0), Err(InvalidButton(0)));
        assert_eq!(Button::try_from(9), Err(InvalidButton(9)));
        assert_eq!(u8::from(button(3)), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_buttons_are_checked() {
        use serde::{
            Deserialize,
            de::{IntoDeserializer, value::Error},
        };

        fn read(number: u8) -> Result<Button, Error> {
            Button::deserialize(IntoDeserializer::<Error>::into_deserializer(number))
        }

        assert_eq!(read(5), Ok(button(5)));
        assert!(read(9).is_err());
        assert!(read(0).is_err());
    }

    #[test]
    fn shifting_wraps_around_the_ring() {
        assert_eq!(button(2).shift_left(3), button(7));
        assert_eq!(button(7).shift_right(3), button(2));
        assert_eq!(button(1).shift_left(2), button(7));
        assert_eq!(button(8).shift_right(1), button(1));
        assert_eq!(button(5).shift_right(8), button(5));
    }

    #[test]
    fn distance_takes_the_short_way() {
        assert_eq!(button(2).distance(button(7)), 3);
        assert_eq!(button(1).distance(button(5)), 4);
        assert_eq!(button(8).distance(button(1)), 1);
        assert_eq!(button(3).distance(button(3)), 0);
    }

    #[test]
    fn touch_positions_need_an_index_except_center() {
        assert_eq!(Position::touch(TouchArea::C, None), Some(Position::CENTER));
        assert_eq!(Position::touch(TouchArea::C, Some(button(1))), None);
        assert_eq!(Position::touch(TouchArea::B, None), None);
        let b3 = Position::touch(TouchArea::B, Some(button(3))).unwrap();
        assert_eq!(b3.to_string(), "B3");
        assert_eq!(Position::CENTER.to_string(), "C");
        assert_eq!(Position::Button(button(6)).area(), TouchArea::A);
    }

    #[test]
    fn kinds_map_to_types() {
        assert_eq!(NoteKind::Hold { length: 96 }.note_type(), NoteType::Hold);
        assert_eq!(
            NoteKind::TouchHold {
                length: 0,
                firework: true
            }
            .hold_length(),
            Some(0)
        );
        assert!(NoteKind::TouchTap { firework: true }.firework());
        assert!(NoteType::BreakStar.is_star());
        assert!(NoteType::BreakStar.is_break());
    }
}
