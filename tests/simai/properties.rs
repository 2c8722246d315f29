use pretty_assertions::assert_eq;

use maichart::prelude::*;

fn parse(source: &str) -> ParsedNotes {
    parse_notes(source, &SimaiConfig::default()).unwrap()
}

fn error(source: &str) -> SimaiError {
    parse_notes(source, &SimaiConfig::default())
        .unwrap_err()
        .into_content()
}

#[test]
fn caret_takes_the_shorter_way() {
    let parsed = parse("2^7[16:3],");
    let slide = parsed.notes.iter().find_map(Note::slide).unwrap();
    assert_eq!(slide.shape, SlideType::CurveL);
    assert_eq!(slide.end, Button::new(7).unwrap());
    assert_eq!(slide.travel, 72);

    let parsed = parse("2^4[4:1],");
    let slide = parsed.notes.iter().find_map(Note::slide).unwrap();
    assert_eq!(slide.shape, SlideType::CurveR);
}

#[test]
fn rejects_invalid_input() {
    assert!(matches!(
        error("X"),
        SimaiError::InvalidNoteSyntax { token, .. } if token.contains('X')
    ));
    assert!(matches!(error("{X}1,"), SimaiError::InvalidDurationFormat(_)));
    assert!(matches!(
        error("(X){4}1,"),
        SimaiError::InvalidBpm { token } if token == "X"
    ));
}

#[test]
fn error_points_at_item() {
    let source = "1,2,9,4,";
    let err = parse_notes(source, &SimaiConfig::default()).unwrap_err();
    assert_eq!(&source[err.range()], "9");
}

#[test]
fn single_rest_advances_one_position() {
    let parsed = parse(",");
    assert!(parsed.notes.is_empty());
    assert_eq!(parsed.end, GridTime::new(1, 96));
}

#[test]
fn statistics_sums_agree() {
    let parsed = parse("1b-5[4:1]/2h[4:1],Ch[4:1]/3x$,4b/5,6b$,");
    let stats = parsed.statistics;
    assert_eq!(
        stats.judge.total,
        stats.judge.tap + stats.judge.hold + stats.judge.slide
    );
    assert_eq!(
        stats.max_score.total,
        stats.max_score.tap + stats.max_score.hold + stats.max_score.slide + stats.max_score.break_note
    );
    assert_eq!(stats.grouped.break_note, 3);
    assert_eq!(stats.each_pairs, 3);
    assert_eq!(stats.max_score.break_note, 3 * 2600);
}

#[test]
fn config_changes_resolution() {
    let config = SimaiConfig::default().with_grids_per_measure(192);
    let parsed = parse_notes("{4}1,2,", &config).unwrap();
    assert_eq!(parsed.grids_per_measure, 192);
    assert_eq!(parsed.notes[1].time, GridTime::new(1, 48));
}
