//! The grammar of a single note inside an each-group.
//!
//! ```text
//! note       = ['*'] position decorators [slide] ('*' slide)* [length] decorators
//! position   = [1-8] | [ABDE][1-8] | 'C'
//! decorators = [@$bfhx?!]*
//! slide      = notation [1-8]{1,2} [length]
//! notation   = one or two of [-^<>pqszvVw]
//! length     = '[' [^\]]* ']'
//! ```
//!
//! The grammar only tags the pieces. Which combinations make sense is decided in
//! [`super::build`].

use std::str::FromStr;

use chumsky::prelude::*;

use super::SimaiError;
use crate::chart::note::{Button, Position, TouchArea};

/// A single-character note modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decorator {
    /// `@`: a slide head shaped like a ring tap.
    ForceRing,
    /// `$`: a tap shaped like a star.
    ForceStar,
    /// `b`
    Break,
    /// `h`
    Hold,
    /// `x`
    Ex,
    /// `f`
    Firework,
    /// `?` or `!`: a slide without a star head.
    NoStar,
}

impl Decorator {
    /// Reads a decorator character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(Self::ForceRing),
            '$' => Some(Self::ForceStar),
            'b' => Some(Self::Break),
            'h' => Some(Self::Hold),
            'x' => Some(Self::Ex),
            'f' => Some(Self::Firework),
            '?' | '!' => Some(Self::NoStar),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of [`Decorator`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Decorators(u8);

impl Decorators {
    /// Whether `decorator` is present.
    #[must_use]
    pub const fn contains(self, decorator: Decorator) -> bool {
        self.0 & decorator.bit() != 0
    }

    /// Adds `decorator`.
    pub const fn insert(&mut self, decorator: Decorator) {
        self.0 |= decorator.bit();
    }

    /// Both sets together.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl FromIterator<Decorator> for Decorators {
    fn from_iter<I: IntoIterator<Item = Decorator>>(iter: I) -> Self {
        let mut set = Self::default();
        for decorator in iter {
            set.insert(decorator);
        }
        set
    }
}

/// A slide shape glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideNotation {
    /// `-`
    Straight,
    /// `^`, the shorter way around the ring.
    Curve,
    /// `<`
    CurveLeft,
    /// `>`
    CurveRight,
    /// `p`
    CenterLeft,
    /// `q`
    CenterRight,
    /// `pp`
    SideLeft,
    /// `qq`
    SideRight,
    /// `s`
    LetterS,
    /// `z`
    LetterZ,
    /// `v`
    LetterV,
    /// `V`
    Refractive,
    /// `w`
    Fan,
}

impl SlideNotation {
    /// The glyph as written.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "-",
            Self::Curve => "^",
            Self::CurveLeft => "<",
            Self::CurveRight => ">",
            Self::CenterLeft => "p",
            Self::CenterRight => "q",
            Self::SideLeft => "pp",
            Self::SideRight => "qq",
            Self::LetterS => "s",
            Self::LetterZ => "z",
            Self::LetterV => "v",
            Self::Refractive => "V",
            Self::Fan => "w",
        }
    }
}

impl FromStr for SlideNotation {
    type Err = SimaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => Self::Straight,
            "^" => Self::Curve,
            "<" => Self::CurveLeft,
            ">" => Self::CurveRight,
            "p" => Self::CenterLeft,
            "q" => Self::CenterRight,
            "pp" => Self::SideLeft,
            "qq" => Self::SideRight,
            "s" => Self::LetterS,
            "z" => Self::LetterZ,
            "v" => Self::LetterV,
            "V" => Self::Refractive,
            "w" => Self::Fan,
            other => return Err(SimaiError::UnknownSlideNotation(other.to_string())),
        })
    }
}

impl std::fmt::Display for SlideNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slide segment as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSlide<'a> {
    /// The shape glyphs, not yet checked against [`SlideNotation`].
    pub notation: &'a str,
    /// The end button, preceded by the refract button for `V`.
    pub ends: Vec<Button>,
    /// The text between the brackets.
    pub length: Option<&'a str>,
}

/// One note as written, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNote<'a> {
    /// Whether the note started with `*`.
    pub continuation: bool,
    /// The start position.
    pub position: Position,
    /// Every decorator around the note.
    pub decorators: Decorators,
    /// Slide segments, the first attached to the position unless `head_slide` is false.
    pub slides: Vec<RawSlide<'a>>,
    /// Whether the first slide directly follows the position instead of a `*`.
    pub head_slide: bool,
    /// The length of a hold, or a misplaced length after a tap.
    pub length: Option<&'a str>,
}

fn button<'a>() -> impl Parser<'a, &'a str, Button, extra::Err<Rich<'a, char>>> + Clone {
    one_of("12345678").try_map(|c: char, span| {
        Button::from_char(c).ok_or_else(|| Rich::custom(span, format!("`{c}` is not a button")))
    })
}

fn position<'a>() -> impl Parser<'a, &'a str, Position, extra::Err<Rich<'a, char>>> + Clone {
    let sensor = one_of("ABDE")
        .then(button())
        .try_map(|(area, index): (char, Button), span| {
            TouchArea::from_char(area)
                .and_then(|area| Position::touch(area, Some(index)))
                .ok_or_else(|| Rich::custom(span, format!("`{area}{index}` is not a sensor")))
        });
    choice((
        button().map(Position::Button),
        sensor,
        just('C').to(Position::CENTER),
    ))
}

fn decorators<'a>() -> impl Parser<'a, &'a str, Decorators, extra::Err<Rich<'a, char>>> + Clone {
    one_of("@$bfhx?!")
        .repeated()
        .collect::<Vec<char>>()
        .map(|chars| chars.into_iter().filter_map(Decorator::from_char).collect())
}

fn length<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> + Clone {
    none_of("]")
        .repeated()
        .to_slice()
        .delimited_by(just('['), just(']'))
}

fn slide<'a>() -> impl Parser<'a, &'a str, RawSlide<'a>, extra::Err<Rich<'a, char>>> + Clone {
    one_of("-^<>pqszvVw")
        .repeated()
        .at_least(1)
        .at_most(2)
        .to_slice()
        .then(button().repeated().at_least(1).at_most(2).collect::<Vec<_>>())
        .then(length().or_not())
        .map(|((notation, ends), length)| RawSlide {
            notation,
            ends,
            length,
        })
}

/// The parser of one note.
pub fn note<'a>() -> impl Parser<'a, &'a str, RawNote<'a>, extra::Err<Rich<'a, char>>> {
    just('*')
        .or_not()
        .map(|star| star.is_some())
        .then(position())
        .then(decorators())
        .then(slide().or_not())
        .then(just('*').ignore_then(slide()).repeated().collect::<Vec<_>>())
        .then(length().or_not())
        .then(decorators())
        .then_ignore(end())
        .map(
            |((((((continuation, position), leading), head), chain), length), trailing)| {
                let head_slide = head.is_some();
                RawNote {
                    continuation,
                    position,
                    decorators: leading.union(trailing),
                    slides: head.into_iter().chain(chain).collect(),
                    head_slide,
                    length,
                }
            },
        )
}

/// Parses one note, turning grammar failures into [`SimaiError::InvalidNoteSyntax`].
///
/// # Errors
///
/// Returns the first grammar failure as the reason.
pub fn parse_note(token: &str) -> Result<RawNote<'_>, SimaiError> {
    note().parse(token).into_result().map_err(|errors| {
        let reason = errors
            .first()
            .map_or_else(|| "unrecognized note".to_string(), ToString::to_string);
        SimaiError::note(token, reason)
    })
}
