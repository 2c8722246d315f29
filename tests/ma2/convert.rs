use std::collections::HashMap;

use pretty_assertions::assert_eq;

use maichart::prelude::*;

const MUSIC_XML: &str = include_str!("files/Music.xml");
const SCORE: &str = include_str!("files/000100_03.ma2");
const SAMPLE: &str = include_str!("../simai/files/sample_maidata.txt");

#[test]
fn fixture_package_to_simai() {
    let text = ma2_to_simai(
        MUSIC_XML,
        |file| (file == "000100_03.ma2").then(|| SCORE.to_string()),
        &SimaiConfig::default(),
    )
    .unwrap();
    let music = parse_maidata(&text, &SimaiConfig::default()).unwrap();
    assert_eq!(music.title, "Fixture Song");
    assert_eq!(music.artist.as_deref(), Some("Fixture Artist"));
    assert_eq!(music.notes_data.len(), 1);
    let master = &music.notes_data[&Difficulty::Master];
    assert_eq!(master.designer.as_deref(), Some("Fixture Designer"));
    assert_eq!(master.notes, parse_score(SCORE).unwrap().notes);
}

#[test]
fn measure_zero_notes_keep_their_spacing() {
    let score = "RESOLUTION\t384\r\nBPM\t0\t0\t150.000\r\nTAP\t0\t0\t0\r\nTAP\t0\t192\t1\r\nTAP\t1\t0\t2\r\n";
    let text = ma2_to_simai(
        MUSIC_XML,
        |file| (file == "000100_03.ma2").then(|| score.to_string()),
        &SimaiConfig::default(),
    )
    .unwrap();
    let music = parse_maidata(&text, &SimaiConfig::default()).unwrap();
    let master = &music.notes_data[&Difficulty::Master];
    assert_eq!(
        master
            .notes
            .iter()
            .map(|note| note.time)
            .collect::<Vec<_>>(),
        vec![GridTime::new(1, 0), GridTime::new(1, 192), GridTime::new(2, 0)]
    );
    assert_eq!(master.bpms[0].bpm, 150.0);
    assert_eq!(master.statistics.each_pairs, 0);
    assert_eq!(
        master.statistics,
        parse_score(score).unwrap().statistics,
        "rendered as `{text}`"
    );
}

#[test]
fn sample_document_to_package_and_back() {
    let simai_config = SimaiConfig::default();
    let package = simai_to_ma2(SAMPLE, 834, &simai_config, &Ma2Config::default()).unwrap();
    assert_eq!(
        package
            .scores
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>(),
        vec!["000834_00.ma2", "000834_02.ma2", "000834_03.ma2"]
    );
    let files: HashMap<String, String> = package.scores.iter().cloned().collect();
    let text = ma2_to_simai(&package.music_xml, |file| files.get(file).cloned(), &simai_config)
        .unwrap();

    let before = parse_maidata(SAMPLE, &simai_config).unwrap();
    let after = parse_maidata(&text, &simai_config).unwrap();
    assert_eq!(after.title, before.title);
    assert_eq!(after.bpm, before.bpm);
    for (difficulty, data) in &before.notes_data {
        let converted = &after.notes_data[difficulty];
        assert_eq!(converted.notes, data.notes, "{difficulty:?}");
        assert_eq!(converted.level, data.level);
        assert_eq!(converted.statistics, data.statistics);
    }
}

#[test]
fn invalid_document_is_reported() {
    assert_eq!(
        simai_to_ma2("&artist=x", 1, &SimaiConfig::default(), &Ma2Config::default()),
        Err(ConvertError::Maidata(MaidataError::MissingRequiredField(
            "title".to_string()
        )))
    );
    assert!(matches!(
        ma2_to_simai("<NotMusic/>", |_| None, &SimaiConfig::default()),
        Err(ConvertError::Metadata(MetadataError::MissingRequiredField(_)))
    ));
}
