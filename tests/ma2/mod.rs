//! Tests for `maichart::ma2` and the package conversions.

mod convert;
mod metadata;
mod score;
