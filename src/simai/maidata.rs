//! The `maidata.txt` document: `&key=value` rows around the note streams.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{SimaiConfig, SimaiErrorWithRange, parse_notes, render_notes};
use crate::chart::{AssetPaths, Difficulty, MusicData, MusicNotesData};

/// An error in a `maidata.txt` document.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaidataError {
    /// A key that every document needs is absent or empty.
    #[error("missing required field `{0}`")]
    MissingRequiredField(String),
    /// A value cannot be read as what its key stands for.
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue {
        /// The key.
        key: String,
        /// The value as written.
        value: String,
    },
    /// A note stream is invalid.
    #[error("in chart of {difficulty:?}: {source}")]
    Chart {
        /// The difficulty whose `inote_N` failed.
        difficulty: Difficulty,
        /// The error inside the stream.
        source: SimaiErrorWithRange,
    },
}

/// The raw rows of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maidata {
    values: BTreeMap<String, String>,
}

impl Maidata {
    /// Reads every `&key=value` row.
    ///
    /// An `inote_*` value continues over the following lines until a line that is only `E`
    /// or a line starting with `&`. Lines starting with `||` are comments and whitespace is
    /// dropped from the stream.
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();
        while let Some(line) = lines.next() {
            let Some(row) = line.strip_prefix('&') else {
                continue;
            };
            let Some((key, value)) = row.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if key.starts_with("inote_") {
                value.retain(|c| !c.is_whitespace());
                if value.starts_with("||") {
                    value.clear();
                }
                let mut closed = is_closed(&value);
                while !closed {
                    let Some(next) = lines.next_if(|next| !next.starts_with('&')) else {
                        break;
                    };
                    if next.eq_ignore_ascii_case("e") {
                        closed = true;
                    } else if !next.starts_with("||") {
                        value.extend(next.chars().filter(|c| !c.is_whitespace()));
                        closed = is_closed(&value);
                    }
                }
            }
            values.insert(key.to_string(), value);
        }
        Self { values }
    }

    /// The value of `key`, `None` when absent or empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Every key and value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn get_number(&self, key: &str) -> Result<Option<f64>, MaidataError> {
        self.get(key)
            .map(|value| {
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .ok_or_else(|| MaidataError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })
            })
            .transpose()
    }
}

fn is_closed(stream: &str) -> bool {
    stream.eq_ignore_ascii_case("e") || stream.ends_with(",E") || stream.ends_with(",e")
}

/// Reads a level such as `12`, `12+` or `13?`.
#[must_use]
pub fn parse_level(text: &str) -> Option<f64> {
    let text = text.trim().trim_end_matches('?');
    match text.strip_suffix('+') {
        Some(base) => base.parse::<f64>().ok().map(|level| level + 0.5),
        None => text.parse::<f64>().ok(),
    }
    .filter(|level| level.is_finite() && *level >= 0.0)
}

/// Writes a level, marking a fractional part with `+`.
#[must_use]
pub fn format_level(level: f64) -> String {
    let whole = level.trunc();
    if level > whole {
        format!("{whole}+")
    } else {
        format!("{whole}")
    }
}

/// Reads a whole document into a song.
///
/// # Errors
///
/// Returns [`MaidataError`] for a missing title, an invalid number or an invalid note stream.
pub fn parse_maidata(text: &str, config: &SimaiConfig) -> Result<MusicData, MaidataError> {
    let doc = Maidata::parse(text);
    let title = doc
        .get("title")
        .ok_or_else(|| MaidataError::MissingRequiredField("title".to_string()))?;
    let bpm = doc.get_number("wholebpm")?;
    let chart_config = config.with_default_bpm(bpm.unwrap_or(config.default_bpm));

    let mut notes_data = BTreeMap::new();
    for difficulty in Difficulty::ALL {
        let index = difficulty.simai_index();
        let Some(stream) = doc.get(&format!("inote_{index}")) else {
            continue;
        };
        let parsed = parse_notes(stream, &chart_config)
            .map_err(|source| MaidataError::Chart { difficulty, source })?;
        let level_key = format!("lv_{index}");
        let level = doc
            .get(&level_key)
            .map(|value| {
                parse_level(value).ok_or_else(|| MaidataError::InvalidValue {
                    key: level_key.clone(),
                    value: value.to_string(),
                })
            })
            .transpose()?;
        let designer = doc.get(&format!("des_{index}")).or_else(|| doc.get("des"));
        notes_data.insert(
            difficulty,
            MusicNotesData {
                level,
                designer: designer.map(ToString::to_string),
                ..parsed.into_notes_data()
            },
        );
    }

    Ok(MusicData {
        id: None,
        title: title.to_string(),
        artist: doc
            .get("artist")
            .or_else(|| doc.get("smsg"))
            .or_else(|| doc.get("freemsg"))
            .map(ToString::to_string),
        genre: doc.get("genre").map(ToString::to_string),
        bpm,
        offset: doc.get_number("first")?,
        assets: AssetPaths {
            track: doc.get("track").map(ToString::to_string),
            movie: doc.get("pv").map(ToString::to_string),
            jacket: doc.get("bg").map(ToString::to_string),
        },
        notes_data,
    })
}

/// Writes a song as a `maidata.txt` document.
#[must_use]
pub fn render_maidata(music: &MusicData, config: &SimaiConfig) -> String {
    let mut rows = vec![format!("&title={}", music.title)];
    let optional = [
        ("artist", music.artist.clone()),
        ("genre", music.genre.clone()),
        ("wholebpm", music.bpm.map(|bpm| bpm.to_string())),
        ("first", music.offset.map(|offset| offset.to_string())),
        ("track", music.assets.track.clone()),
        ("pv", music.assets.movie.clone()),
        ("bg", music.assets.jacket.clone()),
    ];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| format!("&{key}={value}"))),
    );
    for (difficulty, data) in &music.notes_data {
        let index = difficulty.simai_index();
        if let Some(level) = data.level {
            rows.push(format!("&lv_{index}={}", format_level(level)));
        }
        if let Some(designer) = &data.designer {
            rows.push(format!("&des_{index}={designer}"));
        }
    }
    let chart_config = config.with_default_bpm(music.bpm.unwrap_or(config.default_bpm));
    for (difficulty, data) in &music.notes_data {
        rows.push(format!(
            "&inote_{}={}",
            difficulty.simai_index(),
            render_notes(data, &chart_config)
        ));
    }
    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simai::SimaiError;

    const DOC: &str = "&title=Test Song
&artist=Someone
&wholebpm=150
&first=0.25
&des=Charter
&des_5=Master Charter
&lv_4=10
&lv_5=12+
&inote_4=(150){4}1,2,
3,4,
E
&inote_5=
|| intro
{1}1-5[4:1],
,
E
";

    #[test]
    fn reads_rows_and_streams() {
        let doc = Maidata::parse(DOC);
        assert_eq!(doc.get("title"), Some("Test Song"));
        assert_eq!(doc.get("inote_4"), Some("(150){4}1,2,3,4,"));
        assert_eq!(doc.get("inote_5"), Some("{1}1-5[4:1],,"));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn builds_music_data() {
        let music = parse_maidata(DOC, &SimaiConfig::default()).unwrap();
        assert_eq!(music.title, "Test Song");
        assert_eq!(music.artist.as_deref(), Some("Someone"));
        assert_eq!(music.bpm, Some(150.0));
        assert_eq!(music.offset, Some(0.25));
        let expert = &music.notes_data[&Difficulty::Expert];
        assert_eq!(expert.level, Some(10.0));
        assert_eq!(expert.designer.as_deref(), Some("Charter"));
        assert_eq!(expert.notes.len(), 4);
        let master = &music.notes_data[&Difficulty::Master];
        assert_eq!(master.level, Some(12.5));
        assert_eq!(master.designer.as_deref(), Some("Master Charter"));
        assert_eq!(master.notes.len(), 2);
    }

    #[test]
    fn requires_title() {
        assert_eq!(
            parse_maidata("&artist=x", &SimaiConfig::default()),
            Err(MaidataError::MissingRequiredField("title".to_string()))
        );
    }

    #[test]
    fn reports_chart_and_value_errors() {
        let err = parse_maidata("&title=t\n&inote_5=X,\nE", &SimaiConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MaidataError::Chart { difficulty: Difficulty::Master, ref source }
                if matches!(source.content(), SimaiError::InvalidNoteSyntax { .. })
        ));
        assert_eq!(
            parse_maidata("&title=t\n&wholebpm=fast", &SimaiConfig::default()),
            Err(MaidataError::InvalidValue {
                key: "wholebpm".to_string(),
                value: "fast".to_string()
            })
        );
    }

    #[test]
    fn levels() {
        assert_eq!(parse_level("12+"), Some(12.5));
        assert_eq!(parse_level("13?"), Some(13.0));
        assert_eq!(parse_level("x"), None);
        assert_eq!(format_level(12.5), "12+");
        assert_eq!(format_level(7.0), "7");
    }

    #[test]
    fn render_then_parse_keeps_song() {
        let config = SimaiConfig::default();
        let music = parse_maidata(DOC, &config).unwrap();
        let text = render_maidata(&music, &config);
        let again = parse_maidata(&text, &config).unwrap();
        assert_eq!(again.title, music.title);
        assert_eq!(again.notes_data.len(), 2);
        for (difficulty, data) in &music.notes_data {
            let other = &again.notes_data[difficulty];
            assert_eq!(other.notes, data.notes);
            assert_eq!(other.level, data.level);
        }
    }
}
