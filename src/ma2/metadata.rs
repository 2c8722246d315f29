//! The `Music.xml` file of an MA2 package.
//!
//! Only the song identity, tempo and the six `Notes` slots are read back. Writing produces the
//! whole element tree the game expects, filling fixed values for everything the chart model
//! does not carry.

use std::collections::BTreeMap;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use roxmltree::{Document, Node};
use thiserror::Error;

use super::score_file_name;
use crate::chart::{Difficulty, MusicData};

const NET_OPEN_NAME: &str = "Net191101";
const RELEASE_TAG: &str = "Ver1.00.00";
const GENRE_ID: u32 = 104;
const GENRE_NAME: &str = "バラエティ";
const ADD_VERSION_ID: u32 = 13;
const ADD_VERSION_NAME: &str = "maimaDX";
const UNKNOWN_PERSON_ID: u32 = 999;
const NO_DESIGNER: &str = "-";

/// An error in a `Music.xml` file.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetadataError {
    /// The text is not well-formed XML.
    #[error("unable to parse XML: {0}")]
    Xml(String),
    /// An element every file needs is absent.
    #[error("missing required field `{0}`")]
    MissingRequiredField(String),
    /// An element cannot be read as what it stands for.
    #[error("invalid value `{value}` in `{field}`")]
    InvalidValue {
        /// The path of the element.
        field: String,
        /// The text as written.
        value: String,
    },
    /// The XML writer failed.
    #[error("unable to write XML: {0}")]
    Write(String),
}

impl From<roxmltree::Error> for MetadataError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::Error> for MetadataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Write(err.to_string())
    }
}

/// One `Notes` slot of the metadata.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ma2NotesEntry {
    /// The score file of this slot.
    pub file_path: Option<String>,
    /// `level + levelDecimal / 10`, `None` when both are zero.
    pub level: Option<f64>,
    /// The designer, `None` for `-`.
    pub designer: Option<String>,
}

/// What `Music.xml` says about a song.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ma2Metadata {
    /// The value of `name/id`.
    pub id: u32,
    /// The value of `name/str`.
    pub title: String,
    /// The value of `artistName/str`.
    pub artist: Option<String>,
    /// The value of `genreName/str`.
    pub genre: Option<String>,
    /// The value of `bpm`.
    pub bpm: Option<f64>,
    /// The `Notes` slots by difficulty.
    pub notes: BTreeMap<Difficulty, Ma2NotesEntry>,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

fn text_at<'a>(node: Node<'a, '_>, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(node, |node, name| child(node, name))?
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn number_at(node: Node<'_, '_>, path: &[&str]) -> Result<Option<f64>, MetadataError> {
    text_at(node, path)
        .map(|text| {
            text.parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or_else(|| MetadataError::InvalidValue {
                    field: path.join("/"),
                    value: text.to_string(),
                })
        })
        .transpose()
}

fn parse_notes_entry(notes: Node<'_, '_>) -> Result<Ma2NotesEntry, MetadataError> {
    let level = number_at(notes, &["level"])?.unwrap_or(0.0);
    let decimal = number_at(notes, &["levelDecimal"])?.unwrap_or(0.0);
    let level = level + decimal / 10.0;
    Ok(Ma2NotesEntry {
        file_path: text_at(notes, &["file", "path"]).map(ToString::to_string),
        level: (level > 0.0).then_some(level),
        designer: text_at(notes, &["notesDesigner", "str"])
            .filter(|designer| *designer != NO_DESIGNER)
            .map(ToString::to_string),
    })
}

/// Reads a `Music.xml` file.
///
/// # Errors
///
/// Returns [`MetadataError`] for malformed XML, a missing `MusicData` root or `name`, or a
/// non-numeric id, tempo or level.
pub fn parse_metadata(xml: &str) -> Result<Ma2Metadata, MetadataError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "MusicData" {
        return Err(MetadataError::MissingRequiredField("MusicData".to_string()));
    }
    let name = child(root, "name")
        .ok_or_else(|| MetadataError::MissingRequiredField("name".to_string()))?;
    let id_text = text_at(name, &["id"])
        .ok_or_else(|| MetadataError::MissingRequiredField("name/id".to_string()))?;
    let id = id_text
        .parse()
        .map_err(|_| MetadataError::InvalidValue {
            field: "name/id".to_string(),
            value: id_text.to_string(),
        })?;

    let mut notes = BTreeMap::new();
    if let Some(notes_data) = child(root, "notesData") {
        let slots = notes_data
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "Notes");
        for (slot, entry) in slots.enumerate() {
            let Some(difficulty) = u8::try_from(slot).ok().and_then(Difficulty::from_ma2_slot)
            else {
                break;
            };
            notes.insert(difficulty, parse_notes_entry(entry)?);
        }
    }

    Ok(Ma2Metadata {
        id,
        title: text_at(name, &["str"]).unwrap_or_default().to_string(),
        artist: text_at(root, &["artistName", "str"]).map(ToString::to_string),
        genre: text_at(root, &["genreName", "str"]).map(ToString::to_string),
        bpm: number_at(root, &["bpm"])?,
        notes,
    })
}

/// The `musicLevelID` of a level.
///
/// Levels up to 6 map to themselves. From 7 on, each whole level takes two ids, the second
/// one for its `+` half. The id stops at 24, which is `15+`.
#[must_use]
pub fn music_level_id(level: f64) -> u32 {
    let whole = level.trunc().max(0.0);
    let plus = level > whole;
    let whole = whole as u32;
    if whole < 7 {
        return whole;
    }
    (7 + 2 * (whole - 7) + u32::from(plus)).min(24)
}

struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn open(&mut self, name: &str) -> Result<(), MetadataError> {
        self.inner.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), MetadataError> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes `<name>text</name>`, or `<name/>` for empty text.
    fn text(&mut self, name: &str, text: &str) -> Result<(), MetadataError> {
        if text.is_empty() {
            self.inner.write_event(Event::Empty(BytesStart::new(name)))?;
            return Ok(());
        }
        self.open(name)?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// Writes `<name><id>id</id><str>text</str></name>`.
    fn id_str(&mut self, name: &str, id: u32, text: &str) -> Result<(), MetadataError> {
        self.open(name)?;
        self.text("id", &id.to_string())?;
        self.text("str", text)?;
        self.close(name)
    }

    fn finish(self) -> Result<String, MetadataError> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|err| MetadataError::Write(err.to_string()))
    }
}

/// Writes the `Music.xml` of a song stored under `id`.
///
/// Every one of the six slots is written. Slots without a chart get level 0 and designer `-`.
///
/// # Errors
///
/// Returns [`MetadataError::Write`] if the XML writer fails.
pub fn render_metadata(music: &MusicData, id: u32) -> Result<String, MetadataError> {
    let title = music.title.as_str();
    let sort_name: String = title.chars().filter(char::is_ascii_alphanumeric).collect();
    let bpm = music.bpm.unwrap_or(120.0).to_string();

    let mut w = XmlWriter::new();
    w.inner
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    w.open("MusicData")?;
    w.text("dataName", &format!("music{id:06}"))?;
    w.id_str("netOpenName", 0, NET_OPEN_NAME)?;
    w.id_str("releaseTagName", 1, RELEASE_TAG)?;
    w.text("disable", "false")?;
    w.id_str("name", id, title)?;
    w.id_str("rightsInfoName", 0, "")?;
    w.text("sortName", &sort_name)?;
    w.id_str(
        "artistName",
        UNKNOWN_PERSON_ID,
        music.artist.as_deref().unwrap_or_default(),
    )?;
    w.id_str("genreName", GENRE_ID, GENRE_NAME)?;
    w.text("bpm", &bpm)?;
    w.text("version", "20000")?;
    w.id_str("AddVersion", ADD_VERSION_ID, ADD_VERSION_NAME)?;
    w.id_str("movieName", id, title)?;
    w.id_str("cueName", id, title)?;
    w.text("dresscode", "false")?;
    w.id_str("eventName", 0, "")?;
    w.id_str("subEventName", 0, "")?;
    w.text("lockType", "0")?;
    w.text("subLockType", "1")?;

    w.open("notesData")?;
    for difficulty in Difficulty::ALL {
        let Some(path) = score_file_name(id, difficulty) else {
            continue;
        };
        let data = music.notes_data.get(&difficulty);
        let level = data.and_then(|data| data.level).unwrap_or(0.0);
        let whole = level.trunc();
        let decimal = ((level - whole) * 10.0).round();
        let designer = data
            .and_then(|data| data.designer.as_deref())
            .unwrap_or(NO_DESIGNER);
        w.open("Notes")?;
        w.open("file")?;
        w.text("path", &path)?;
        w.close("file")?;
        w.text("level", &whole.to_string())?;
        w.text("levelDecimal", &decimal.to_string())?;
        w.id_str("notesDesigner", UNKNOWN_PERSON_ID, designer)?;
        w.text("notesType", "0")?;
        w.text("musicLevelID", &music_level_id(level).to_string())?;
        w.text("isTouchEnable", "false")?;
        w.text("isEnable", "false")?;
        w.close("Notes")?;
    }
    w.close("notesData")?;

    w.text("jacketFile", "")?;
    w.text("thumbnailName", "")?;
    w.text("rightFile", "")?;
    w.text("priority", "0")?;
    w.close("MusicData")?;
    w.finish()
}
