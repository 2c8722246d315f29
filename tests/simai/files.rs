use pretty_assertions::assert_eq;

use maichart::prelude::*;

const SAMPLE: &str = include_str!("files/sample_maidata.txt");

#[test]
fn reads_sample_document() {
    let music = parse_maidata(SAMPLE, &SimaiConfig::default()).unwrap();
    assert_eq!(music.title, "Sample Stream");
    assert_eq!(music.artist.as_deref(), Some("Test Artist"));
    assert_eq!(music.genre.as_deref(), Some("Variety"));
    assert_eq!(music.bpm, Some(160.0));
    assert_eq!(music.offset, Some(1.5));
    assert_eq!(
        music.notes_data.keys().copied().collect::<Vec<_>>(),
        vec![Difficulty::Basic, Difficulty::Expert, Difficulty::Master]
    );

    let basic = &music.notes_data[&Difficulty::Basic];
    assert_eq!(basic.level, Some(5.0));
    assert_eq!(basic.designer.as_deref(), Some("Default Designer"));
    assert_eq!(basic.statistics.counts.tap, 14);
    assert_eq!(basic.statistics.counts.hold, 1);
    assert_eq!(basic.statistics.each_pairs, 1);

    let expert = &music.notes_data[&Difficulty::Expert];
    assert_eq!(expert.level, Some(10.5));
    assert_eq!(expert.designer.as_deref(), Some("Expert Designer"));
    assert_eq!(
        expert.bpms.iter().map(|change| change.bpm).collect::<Vec<_>>(),
        vec![160.0, 180.0]
    );
    assert_eq!(expert.statistics.counts.slide, 7);
    assert_eq!(expert.statistics.counts.touch_tap, 3);
    assert_eq!(expert.statistics.counts.touch_hold, 1);
}

#[test]
fn pseudo_each_notes_are_offset() {
    let music = parse_maidata(SAMPLE, &SimaiConfig::default()).unwrap();
    let expert = &music.notes_data[&Difficulty::Expert];
    let times: Vec<GridTime> = expert
        .notes
        .iter()
        .filter(|note| note.time.measure == 2 && note.time.grid < 96)
        .map(|note| note.time)
        .collect();
    assert_eq!(
        times,
        vec![
            GridTime::new(2, 0),
            GridTime::new(2, 0),
            GridTime::new(2, 48),
            GridTime::new(2, 52),
            GridTime::new(2, 56),
        ]
    );
}

#[test]
fn sample_statistics_hold_invariants() {
    let music = parse_maidata(SAMPLE, &SimaiConfig::default()).unwrap();
    for data in music.notes_data.values() {
        let stats = &data.statistics;
        assert_eq!(
            stats.judge.total,
            stats.judge.tap + stats.judge.hold + stats.judge.slide
        );
        assert_eq!(
            stats.max_score.total,
            stats.max_score.tap
                + stats.max_score.hold
                + stats.max_score.slide
                + stats.max_score.break_note
        );
        assert_eq!(stats.total as usize, data.notes.len());
    }
}
