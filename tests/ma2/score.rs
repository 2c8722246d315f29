use pretty_assertions::assert_eq;

use maichart::prelude::*;

const SCORE: &str = include_str!("files/000100_03.ma2");

fn button(number: u8) -> Button {
    Button::new(number).unwrap()
}

#[test]
fn grid_round_trip_scenario() {
    let score = parse_score("TAP\t1\t0\t0\r\nTAP\t2\t0\t7").unwrap();
    assert_eq!(
        score.notes,
        vec![
            Note::new(GridTime::new(1, 0), Position::Button(button(1)), NoteKind::Tap),
            Note::new(GridTime::new(2, 0), Position::Button(button(8)), NoteKind::Tap),
        ]
    );
    assert_eq!(score.statistics.counts.tap, 2);
    assert_eq!(score.statistics.max_score.tap, 1000);
}

#[test]
fn overflowing_grid_lands_in_next_measure() {
    let score = parse_score("TAP\t1\t400\t0\r\nRESOLUTION\t384\r\nTAP\t2\t0\t1").unwrap();
    assert_eq!(
        score
            .notes
            .iter()
            .map(|note| note.time)
            .collect::<Vec<_>>(),
        vec![GridTime::new(2, 0), GridTime::new(2, 16)]
    );

    let config = SimaiConfig::default();
    let text = render_notes(&score.clone().into_notes_data(), &config);
    let parsed = parse_notes(&text, &config).unwrap();
    assert_eq!(parsed.notes, score.notes, "rendered as `{text}`");
}

#[test]
fn invalid_tempo_and_meter_are_rejected() {
    for row in [
        "BPM\t0\t0\tNaN",
        "BPM\t1\t0\t-5",
        "BPM\t1\t0\t0.000",
        "MET\t0\t0\t0\t4",
        "MET\t0\t0\t4\t0",
    ] {
        let source = format!("RESOLUTION\t384\r\n{row}\r\nTAP\t1\t0\t0\r\n");
        let err = parse_score(&source).unwrap_err();
        assert_eq!(&source[err.range()], row);
        assert!(
            matches!(err.content(), ScoreError::MalformedScoreLine { line, .. } if line == row),
            "{row} should be malformed"
        );
    }
}

#[test]
fn reads_fixture() {
    let score = parse_score(SCORE).unwrap();
    assert_eq!(score.resolution, 384);
    assert_eq!(score.bpms, vec![BpmChange { time: GridTime::new(0, 0), bpm: 150.0 }]);
    assert_eq!(score.time_signatures.len(), 1);
    assert_eq!(score.header["T_REC_TAP"], vec!["1".to_string()]);

    let counts = score.statistics.counts;
    assert_eq!(counts.slide, 2);
    assert_eq!(counts.touch_tap, 2);
    assert_eq!(counts.touch_hold, 1);
    assert_eq!(score.statistics.total, 11);

    let straight = score
        .notes
        .iter()
        .find(|note| note.time == GridTime::new(1, 192) && note.slide().is_some())
        .unwrap();
    assert_eq!(straight.position, Position::Button(button(3)));
    assert_eq!(
        straight.slide(),
        Some(&Slide {
            end: button(7),
            shape: SlideType::Straight,
            wait: 96,
            travel: 96,
        })
    );

    let center = score
        .notes
        .iter()
        .find(|note| note.note_type() == NoteType::TouchTap && note.position == Position::CENTER)
        .unwrap();
    assert_eq!(center.kind, NoteKind::TouchTap { firework: true });
    assert!(score.notes.contains(&Note::new(
        GridTime::new(2, 96),
        Position::touch(TouchArea::B, Some(button(4))).unwrap(),
        NoteKind::TouchTap { firework: false },
    )));
}

#[test]
fn simai_notes_keep_their_grid_through_ma2() {
    let config = SimaiConfig::default();
    let data = parse_notes(
        "(150){4}1,2/3,{8}4-8[4:1],5h[8:3],{3}Cf,6b$,7x,{16}8,1,{1}2?<7[2:1],",
        &config,
    )
    .unwrap()
    .into_notes_data();
    let text = render_score(&data, &Ma2Config::default());
    let score = parse_score(&text).unwrap();
    let grids = |notes: &[Note]| {
        notes
            .iter()
            .map(|note| (note.time.measure, note.time.grid))
            .collect::<Vec<_>>()
    };
    assert_eq!(grids(&score.notes), grids(&data.notes));
    assert_eq!(score.notes, data.notes);
}

#[test]
fn ma2_chart_survives_simai() {
    let score = parse_score(SCORE).unwrap();
    let data = score.clone().into_notes_data();
    let config = SimaiConfig::default();
    let text = render_notes(&data, &config);
    let parsed = parse_notes(&text, &config).unwrap();
    assert_eq!(parsed.notes, score.notes, "rendered as `{text}`");
}

#[test]
fn both_paddings_are_read() {
    let tabs = parse_score("HLD\t1\t0\t3\t96\r\nSCR\t1\t0\t0\t96\t48\t2").unwrap();
    let spaces = parse_score("HLD    1    0    3    96\nSCR  1  0  0  96  48  2").unwrap();
    assert_eq!(tabs.notes, spaces.notes);
}

#[test]
fn malformed_row_points_at_row() {
    let source = "RESOLUTION\t384\r\nTAP\t1\t0\t0\r\nXST\t1\t96\r\n";
    let err = parse_score(source).unwrap_err();
    assert_eq!(&source[err.range()], "XST\t1\t96");
    assert!(err.to_string().starts_with("malformed score line"));
}
