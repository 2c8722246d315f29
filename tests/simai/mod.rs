//! Tests for `maichart::simai`.

mod files;
mod properties;
mod round_trip;
