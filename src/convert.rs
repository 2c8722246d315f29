//! Whole-song conversions between a `maidata.txt` document and an MA2 package.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    chart::{Difficulty, MusicData, MusicNotesData},
    ma2::{
        Ma2Config, ScoreErrorWithRange,
        metadata::{MetadataError, parse_metadata, render_metadata},
        parse_score, render_score, score_file_name,
    },
    simai::{
        SimaiConfig,
        maidata::{MaidataError, parse_maidata, render_maidata},
    },
};

/// An error while converting a song.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The `maidata.txt` document is invalid.
    #[error(transparent)]
    Maidata(#[from] MaidataError),
    /// The `Music.xml` file is invalid.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// A score file is invalid.
    #[error("in score file `{file}`: {source}")]
    Score {
        /// The file name from the metadata.
        file: String,
        /// The error inside the score.
        source: ScoreErrorWithRange,
    },
}

/// The files of an MA2 package.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ma2Package {
    /// The contents of `Music.xml`.
    pub music_xml: String,
    /// Score file names and contents, easiest first.
    pub scores: Vec<(String, String)>,
}

/// Converts a `maidata.txt` document into an MA2 package stored under `id`.
///
/// [`Difficulty::Easy`] has no MA2 slot and is left out.
///
/// # Errors
///
/// Returns [`ConvertError::Maidata`] for an invalid document and [`ConvertError::Metadata`] if
/// the XML writer fails.
pub fn simai_to_ma2(
    maidata: &str,
    id: u32,
    simai_config: &SimaiConfig,
    ma2_config: &Ma2Config,
) -> Result<Ma2Package, ConvertError> {
    let mut music = parse_maidata(maidata, simai_config)?;
    music.id = Some(id);
    let score_config = ma2_config
        .clone()
        .with_default_bpm(music.bpm.unwrap_or(ma2_config.default_bpm));

    let mut scores = Vec::new();
    for (&difficulty, data) in &mut music.notes_data {
        let Some(file) = score_file_name(id, difficulty) else {
            continue;
        };
        data.file_path = Some(file.clone());
        scores.push((file, render_score(data, &score_config)));
    }
    Ok(Ma2Package {
        music_xml: render_metadata(&music, id)?,
        scores,
    })
}

/// Reads an MA2 package into a song.
///
/// `load_score` is asked for every score file the metadata names. Files it returns `None` for
/// are skipped.
///
/// # Errors
///
/// Returns [`ConvertError::Metadata`] for an invalid `Music.xml` and [`ConvertError::Score`]
/// for an invalid score file.
pub fn load_ma2(
    music_xml: &str,
    mut load_score: impl FnMut(&str) -> Option<String>,
) -> Result<MusicData, ConvertError> {
    let metadata = parse_metadata(music_xml)?;
    let mut notes_data: BTreeMap<Difficulty, MusicNotesData> = BTreeMap::new();
    for (difficulty, entry) in metadata.notes {
        let Some(file) = entry
            .file_path
            .or_else(|| score_file_name(metadata.id, difficulty))
        else {
            continue;
        };
        let Some(text) = load_score(&file) else {
            continue;
        };
        let score = parse_score(&text).map_err(|source| ConvertError::Score {
            file: file.clone(),
            source,
        })?;
        notes_data.insert(
            difficulty,
            MusicNotesData {
                level: entry.level,
                designer: entry.designer,
                file_path: Some(file),
                ..score.into_notes_data()
            },
        );
    }
    Ok(MusicData {
        id: Some(metadata.id),
        title: metadata.title,
        artist: metadata.artist,
        genre: metadata.genre,
        bpm: metadata.bpm,
        notes_data,
        ..MusicData::default()
    })
}

/// Converts an MA2 package into a `maidata.txt` document.
///
/// # Errors
///
/// See [`load_ma2`].
pub fn ma2_to_simai(
    music_xml: &str,
    load_score: impl FnMut(&str) -> Option<String>,
    config: &SimaiConfig,
) -> Result<String, ConvertError> {
    let music = load_ma2(music_xml, load_score)?;
    Ok(render_maidata(&music, config))
}
