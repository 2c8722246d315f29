//! Source span wrapper for positioned values.
//!
//! [`SourceRangeMixin`] attaches the byte range of the input that produced a value (usually an
//! error) so that callers can point at the offending text, for example with the `diagnostics`
//! feature.

use std::ops::Range;

/// A value paired with the byte range of the source text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRangeMixin<T> {
    content: T,
    range: Range<usize>,
}

impl<T> SourceRangeMixin<T> {
    /// Wraps `content` with the span `range`.
    pub const fn new(content: T, range: Range<usize>) -> Self {
        Self { content, range }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Takes the content out of the wrapper.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the byte range, start inclusive and end exclusive.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Start index of the span.
    pub const fn start(&self) -> usize {
        self.range.start
    }

    /// End index of the span.
    pub const fn end(&self) -> usize {
        self.range.end
    }

    /// Maps the content and keeps the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SourceRangeMixin<U> {
        SourceRangeMixin::new(f(self.content), self.range)
    }

    /// Moves the span by `offset` bytes, used when a value was found inside a sub-slice.
    #[must_use]
    pub fn shifted(self, offset: usize) -> Self {
        let range = self.range.start + offset..self.range.end + offset;
        Self::new(self.content, range)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for SourceRangeMixin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at indices [{}, {})",
            self.content, self.range.start, self.range.end
        )
    }
}

impl<T: std::error::Error + 'static> std::error::Error for SourceRangeMixin<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Extension methods to wrap any value into a [`SourceRangeMixin`].
pub trait SourceRangeMixinExt: Sized {
    /// Wraps `self` with the given span.
    fn into_wrapper_range(self, range: Range<usize>) -> SourceRangeMixin<Self> {
        SourceRangeMixin::new(self, range)
    }

    /// Wraps `self` with the span of another wrapper.
    fn into_wrapper<W>(self, wrapper: &SourceRangeMixin<W>) -> SourceRangeMixin<Self> {
        SourceRangeMixin::new(self, wrapper.range())
    }
}

impl<T> SourceRangeMixinExt for T {}
