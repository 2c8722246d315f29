use pretty_assertions::assert_eq;

use maichart::prelude::*;

fn assert_reparses_identically(source: &str) {
    let config = SimaiConfig::default();
    let first = parse_notes(source, &config).unwrap();
    let rendered = render_notes(&first.clone().into_notes_data(), &config);
    let second = parse_notes(&rendered, &config)
        .unwrap_or_else(|err| panic!("`{rendered}` does not parse: {err}"));
    assert_eq!(second.notes, first.notes, "rendered as `{rendered}`");
    assert_eq!(
        second.bpms.iter().map(|change| change.bpm).collect::<Vec<_>>(),
        first.bpms.iter().map(|change| change.bpm).collect::<Vec<_>>()
    );
    let rendered_again = render_notes(&second.into_notes_data(), &config);
    assert_eq!(rendered_again, rendered);
}

#[test]
fn uniform_divisor() {
    assert_reparses_identically("{4}1,2,3,4,5,6,7,8,");
    assert_reparses_identically("{8}1,,3,,5/6,,7h[8:3],,");
}

#[test]
fn mixed_divisors() {
    assert_reparses_identically("{4}1,{8}2,3,{3}4,5,6,{16}7,8,,,{1}1,");
    assert_reparses_identically("{6}1,2,{12}3,,{24}4,{1},,5,");
}

#[test]
fn tempo_changes() {
    assert_reparses_identically("(120){4}1,2,(150)3,4,(90){8}5-1[4:1],6,");
}

#[test]
fn slides_and_touches() {
    assert_reparses_identically(
        "1-5[4:1]*^7[8:1],2@>6[2:1],3?v7[4:1]/C,Ch[4:1]/E3,4b$,5x,6V84[4:1],7pp3[4:1],8w4[4:1],",
    );
    assert_reparses_identically("(150){4}1-5[1##0.5],2qq6[0.5##1.5],");
}

#[test]
fn sample_document_charts() {
    let config = SimaiConfig::default();
    let music = parse_maidata(include_str!("files/sample_maidata.txt"), &config).unwrap();
    let text = render_maidata(&music, &config);
    let again = parse_maidata(&text, &config).unwrap();
    assert_eq!(again.title, music.title);
    assert_eq!(again.offset, music.offset);
    for (difficulty, data) in &music.notes_data {
        let reparsed = &again.notes_data[difficulty];
        assert_eq!(reparsed.notes, data.notes, "{difficulty:?}");
        assert_eq!(reparsed.level, data.level);
        assert_eq!(reparsed.designer, data.designer);
    }
}
