//! Splits a note stream into comma terminated items.

use std::ops::Range;

use super::{SimaiError, SimaiErrorWithRange};
use crate::chart::mixin::SourceRangeMixinExt;

/// One comma terminated item of a note stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The text inside a `(bpm)` prefix.
    pub bpm: Option<String>,
    /// The text inside a `{divisor}` prefix.
    pub divisor: Option<String>,
    /// The each-group with all whitespace removed, empty for a rest.
    pub group: String,
    /// Byte range of the item in the stream, without the comma and surrounding whitespace.
    pub range: Range<usize>,
}

impl Item {
    fn is_end_marker(&self) -> bool {
        self.bpm.is_none() && self.divisor.is_none() && self.group.eq_ignore_ascii_case("e")
    }
}

/// Splits `source` at every comma and strips the `(bpm)` and `{divisor}` prefixes.
///
/// A trailing empty item after the last comma and a trailing `E` end marker are dropped.
///
/// # Errors
///
/// Returns [`SimaiError::InvalidNoteSyntax`] for a prefix that is never closed.
pub fn split_items(source: &str) -> Result<Vec<Item>, SimaiErrorWithRange> {
    let mut items = Vec::new();
    let mut start = 0;
    for piece in source.split(',') {
        let range = trimmed_range(source, start, piece);
        start += piece.len() + 1;
        let item = read_item(piece, range.clone()).map_err(|err| err.into_wrapper_range(range))?;
        items.push(item);
    }
    if items
        .last()
        .is_some_and(|item| item.group.is_empty() && item.bpm.is_none() && item.divisor.is_none())
    {
        items.pop();
    }
    if items.last().is_some_and(Item::is_end_marker) {
        items.pop();
    }
    Ok(items)
}

fn trimmed_range(source: &str, start: usize, piece: &str) -> Range<usize> {
    let leading = piece.len() - piece.trim_start().len();
    let trimmed_len = piece.trim().len();
    let begin = (start + leading).min(source.len());
    begin..begin + trimmed_len
}

fn read_item(piece: &str, range: Range<usize>) -> Result<Item, SimaiError> {
    let compact: String = piece.chars().filter(|c| !c.is_whitespace()).collect();
    let mut rest = compact.as_str();
    let mut bpm = None;
    let mut divisor = None;
    loop {
        let (close, slot) = match rest.chars().next() {
            Some('(') => (')', &mut bpm),
            Some('{') => ('}', &mut divisor),
            _ => break,
        };
        let Some(end) = rest.find(close) else {
            return Err(SimaiError::note(
                &compact,
                format!("`{}` is never closed", &rest[..1]),
            ));
        };
        *slot = Some(rest[1..end].to_string());
        rest = &rest[end + 1..];
    }
    Ok(Item {
        bpm,
        divisor,
        group: rest.to_string(),
        range,
    })
}
