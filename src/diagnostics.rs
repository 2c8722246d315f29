//! Readable error reports using `ariadne`.
//!
//! Errors that carry a [`SourceRangeMixin`](crate::chart::mixin::SourceRangeMixin), such as
//! [`SimaiErrorWithRange`](crate::simai::SimaiErrorWithRange) and
//! [`ScoreErrorWithRange`](crate::ma2::ScoreErrorWithRange), know the byte range they come
//! from. This module turns them into `ariadne::Report`s, and ariadne works out rows and
//! columns from those byte offsets.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use maichart::{
//!     diagnostics::emit_simai_error,
//!     simai::{SimaiConfig, parse_notes},
//! };
//!
//! let source = "1,2,X,4,";
//! if let Err(err) = parse_notes(source, &SimaiConfig::default()) {
//!     emit_simai_error("inote_5", source, &err)?;
//! }
//! # }
//! # Ok::<(), std::io::Error>(())
//! ```

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::{ma2::ScoreErrorWithRange, simai::SimaiErrorWithRange};

/// The name and text of the source an error points into.
///
/// ```rust
/// use maichart::diagnostics::SimpleSource;
///
/// let source = SimpleSource::new("maidata.txt", "&title=Test\n");
/// assert_eq!(source.name(), "maidata.txt");
/// assert_eq!(source.text(), "&title=Test\n");
/// ```
pub struct SimpleSource<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Creates a source container.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// The source text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// The source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Conversion of a positioned error into an `ariadne::Report`.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Builds the report against `src`, which names the file.
    fn to_report<'a>(&self, src: &SimpleSource<'a>)
    -> Report<'a, (String, std::ops::Range<usize>)>;
}

/// Builds an error report with one colored label, using byte offsets.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: std::ops::Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, std::ops::Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for SimaiErrorWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Error,
            self.range(),
            "simai: invalid note stream",
            self.content(),
            Color::Red,
        )
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for ScoreErrorWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Error,
            self.range(),
            "ma2: invalid score row",
            self.content(),
            Color::Red,
        )
    }
}

#[cfg(feature = "diagnostics")]
fn emit<'a>(
    name: &'a str,
    source: &'a str,
    report: &Report<'a, (String, std::ops::Range<usize>)>,
) -> std::io::Result<()> {
    report.eprint((name.to_string(), Source::from(source)))
}

/// Prints a Simai error to stderr.
///
/// # Errors
///
/// Returns the error of writing to stderr.
#[cfg(feature = "diagnostics")]
pub fn emit_simai_error<'a>(
    name: &'a str,
    source: &'a str,
    error: &SimaiErrorWithRange,
) -> std::io::Result<()> {
    emit(name, source, &error.to_report(&SimpleSource::new(name, source)))
}

/// Prints a score file error to stderr.
///
/// # Errors
///
/// Returns the error of writing to stderr.
#[cfg(feature = "diagnostics")]
pub fn emit_score_error<'a>(
    name: &'a str,
    source: &'a str,
    error: &ScoreErrorWithRange,
) -> std::io::Result<()> {
    emit(name, source, &error.to_report(&SimpleSource::new(name, source)))
}

/// Builds the reports of several errors without printing them.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_reports<'a, E: ToAriadne + 'a>(
    name: &'a str,
    source: &'a str,
    errors: impl IntoIterator<Item = &'a E>,
) -> Vec<Report<'a, (String, std::ops::Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    errors.into_iter().map(|err| err.to_report(&simple)).collect()
}
