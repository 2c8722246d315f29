//! Conversion between the Simai and MA2 notations of maimai charts.
//!
//! Both notations are read into one chart model, [`chart::MusicData`], and written back from
//! it:
//!
//! - [`simai`] reads and writes `maidata.txt` documents and their note streams.
//! - [`ma2`] reads and writes score files and the `Music.xml` metadata of MA2 packages.
//! - [`convert`] connects the two for whole songs.
//!
//! Times are kept on an integer grid, see [`time`]. Every reader stops at the first error,
//! and errors inside a text carry the byte range they were found at, which the `diagnostics`
//! feature renders with `ariadne`.
//!
//! ```rust
//! use maichart::prelude::*;
//!
//! let data = parse_notes("(120){4}1,2,3-7[4:1],", &SimaiConfig::default())
//!     .unwrap()
//!     .into_notes_data();
//! assert_eq!(data.statistics.total, 4);
//!
//! let score = render_score(&data, &Ma2Config::default());
//! let back = parse_score(&score).unwrap();
//! assert_eq!(back.notes, data.notes);
//! ```

pub mod chart;
pub mod convert;
pub mod diagnostics;
pub mod ma2;
pub mod prelude;
pub mod simai;
pub mod time;
