use pretty_assertions::assert_eq;

use maichart::prelude::*;

const MUSIC_XML: &str = include_str!("files/Music.xml");

#[test]
fn reads_fixture() {
    let metadata = parse_metadata(MUSIC_XML).unwrap();
    assert_eq!(metadata.id, 100);
    assert_eq!(metadata.title, "Fixture Song");
    assert_eq!(metadata.artist.as_deref(), Some("Fixture Artist"));
    assert_eq!(metadata.bpm, Some(150.0));
    assert_eq!(metadata.notes.len(), 4);
    assert_eq!(metadata.notes[&Difficulty::Advanced].level, Some(7.5));
    assert_eq!(
        metadata.notes[&Difficulty::Master],
        Ma2NotesEntry {
            file_path: Some("000100_03.ma2".to_string()),
            level: Some(12.7),
            designer: Some("Fixture Designer".to_string()),
        }
    );
}

#[test]
fn written_metadata_reads_back() {
    let mut music = MusicData {
        title: "Ünïcode & <Tags>".to_string(),
        artist: Some("Artist".to_string()),
        bpm: Some(172.5),
        ..MusicData::default()
    };
    for (difficulty, level) in [(Difficulty::Expert, 9.5), (Difficulty::ReMaster, 14.0)] {
        music.notes_data.insert(
            difficulty,
            MusicNotesData {
                level: Some(level),
                ..MusicNotesData::default()
            },
        );
    }
    let xml = render_metadata(&music, 7).unwrap();
    let metadata = parse_metadata(&xml).unwrap();
    assert_eq!(metadata.id, 7);
    assert_eq!(metadata.title, music.title);
    assert_eq!(metadata.bpm, Some(172.5));
    assert_eq!(metadata.notes[&Difficulty::Expert].level, Some(9.5));
    assert_eq!(metadata.notes[&Difficulty::ReMaster].level, Some(14.0));
    assert_eq!(metadata.notes[&Difficulty::ReMaster].designer, None);
    assert_eq!(
        metadata.notes[&Difficulty::Utage].file_path.as_deref(),
        Some("000007_05.ma2")
    );
}
