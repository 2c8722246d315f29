//! Writes a chart as an MA2 score file.
//!
//! The file is laid out in four blocks separated by blank rows: the preamble, the tempo and
//! meter rows, the note rows and the statistics block.

use super::{Ma2Config, command::Ma2Command};
use crate::{
    chart::{BpmChange, MusicNotesData, TimeSignature, stats::MusicStatistics},
    time::GridTime,
};

const ROW_END: &str = "\r\n";

fn row<I>(fields: I) -> String
where
    I: IntoIterator,
    I::Item: ToString,
{
    fields
        .into_iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join("\t")
        .trim()
        .to_string()
}

/// The four `BPM_DEF` values.
///
/// Up to four tempos are taken in order. Exactly two are mirrored into `a b b a`, and
/// anything shorter is padded with `default_bpm`.
fn bpm_defaults(bpms: &[BpmChange], default_bpm: f64) -> [f64; 4] {
    let mut values: Vec<f64> = bpms.iter().take(4).map(|change| change.bpm).collect();
    if let [first, second] = values[..] {
        values.extend([second, first]);
    }
    let mut defaults = [default_bpm; 4];
    for (slot, value) in defaults.iter_mut().zip(values) {
        *slot = value;
    }
    defaults
}

fn statistics_rows(statistics: &MusicStatistics) -> Vec<String> {
    let counts = &statistics.counts;
    let grouped = &statistics.grouped;
    let judge = &statistics.judge;
    let scores = &statistics.max_score;
    let counters: [(&str, u64); 29] = [
        ("T_REC_TAP", counts.tap.into()),
        ("T_REC_BRK", counts.break_note.into()),
        ("T_REC_XTP", counts.ex_tap.into()),
        ("T_REC_HLD", counts.hold.into()),
        ("T_REC_XHO", counts.ex_hold.into()),
        ("T_REC_STR", counts.star.into()),
        ("T_REC_BST", counts.break_star.into()),
        ("T_REC_XST", counts.ex_star.into()),
        ("T_REC_TTP", counts.touch_tap.into()),
        ("T_REC_THO", counts.touch_hold.into()),
        ("T_REC_SLD", counts.slide.into()),
        ("T_REC_ALL", statistics.total.into()),
        ("T_NUM_TAP", grouped.tap.into()),
        ("T_NUM_BRK", grouped.break_note.into()),
        ("T_NUM_HLD", grouped.hold.into()),
        ("T_NUM_SLD", grouped.slide.into()),
        ("T_NUM_ALL", statistics.total.into()),
        ("T_JUDGE_TAP", judge.tap.into()),
        ("T_JUDGE_HLD", judge.hold.into()),
        ("T_JUDGE_SLD", judge.slide.into()),
        ("T_JUDGE_ALL", judge.total.into()),
        ("TTM_EACHPAIRS", statistics.each_pairs.into()),
        ("TTM_SCR_TAP", scores.tap),
        ("TTM_SCR_BRK", scores.break_note),
        ("TTM_SCR_HLD", scores.hold),
        ("TTM_SCR_SLD", scores.slide),
        ("TTM_SCR_ALL", scores.total),
        ("TTM_SCR_S", 0),
        ("TTM_SCR_SS", 0),
    ];
    let mut rows: Vec<String> = counters
        .iter()
        .map(|(name, value)| row([name.to_string(), value.to_string()]))
        .collect();
    rows.push(row(["TTM_RAT_ACV".to_string(), statistics.achievement.to_string()]));
    rows
}

/// Renders a chart as a score file.
///
/// A chart without tempo changes gets one `BPM` row of `config.default_bpm` at the start, and
/// one without meter changes gets 4/4.
#[must_use]
pub fn render_score(data: &MusicNotesData, config: &Ma2Config) -> String {
    let bpms = if data.bpms.is_empty() {
        vec![BpmChange {
            time: GridTime::START,
            bpm: config.default_bpm,
        }]
    } else {
        data.bpms.clone()
    };
    let time_signatures = if data.time_signatures.is_empty() {
        vec![TimeSignature::common()]
    } else {
        data.time_signatures.clone()
    };
    let meter = time_signatures
        .first()
        .copied()
        .unwrap_or_else(TimeSignature::common);
    let resolution = data.grids_per_measure.to_string();

    let mut rows = vec![
        row(["VERSION", "0.00.00", config.version.as_str()]),
        row(["FES_MODE".to_string(), config.fes_mode.to_string()]),
        row(std::iter::once("BPM_DEF".to_string()).chain(
            bpm_defaults(&bpms, config.default_bpm)
                .iter()
                .map(|bpm| format!("{bpm:.3}")),
        )),
        row([
            "MET_DEF".to_string(),
            meter.beat_length.to_string(),
            meter.divisor.to_string(),
        ]),
        row(["RESOLUTION", resolution.as_str()]),
        row(["CLK_DEF", resolution.as_str()]),
        row(["COMPATIBLE_CODE", config.compatible_code.as_str()]),
        String::new(),
    ];
    rows.extend(bpms.into_iter().map(|change| Ma2Command::Bpm(change).to_string()));
    rows.extend(
        time_signatures
            .into_iter()
            .map(|signature| Ma2Command::Met(signature).to_string()),
    );
    rows.push(String::new());
    rows.extend(data.notes.iter().map(|note| Ma2Command::Note(*note).to_string()));
    rows.push(String::new());
    rows.extend(statistics_rows(&data.statistics));
    rows.push(String::new());

    let mut out = rows.join(ROW_END);
    out.push_str(ROW_END);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ma2::parse_score,
        simai::{SimaiConfig, parse_notes},
    };

    fn chart(source: &str) -> MusicNotesData {
        parse_notes(source, &SimaiConfig::default())
            .unwrap()
            .into_notes_data()
    }

    #[test]
    fn bpm_def_rules() {
        let change = |bpm| BpmChange {
            time: GridTime::START,
            bpm,
        };
        assert_eq!(bpm_defaults(&[], 120.0), [120.0; 4]);
        assert_eq!(
            bpm_defaults(&[change(150.0)], 120.0),
            [150.0, 120.0, 120.0, 120.0]
        );
        assert_eq!(
            bpm_defaults(&[change(150.0), change(180.0)], 120.0),
            [150.0, 180.0, 180.0, 150.0]
        );
        assert_eq!(
            bpm_defaults(
                &[change(1.0), change(2.0), change(3.0), change(4.0), change(5.0)],
                120.0
            ),
            [1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn writes_preamble_and_rows() {
        let text = render_score(&chart("(150){4}1,2h[4:1],"), &Ma2Config::default());
        let rows: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            rows[..12],
            [
                "VERSION\t0.00.00\t1.03.00",
                "FES_MODE\t0",
                "BPM_DEF\t150.000\t120.000\t120.000\t120.000",
                "MET_DEF\t4\t4",
                "RESOLUTION\t384",
                "CLK_DEF\t384",
                "COMPATIBLE_CODE\tMA2",
                "",
                "BPM\t1\t0\t150.000",
                "MET\t1\t0\t4\t4",
                "",
                "TAP\t1\t0\t0",
            ]
        );
        assert_eq!(rows[12], "HLD\t1\t96\t1\t96");
        assert_eq!(rows[13], "");
        assert_eq!(rows[14], "T_REC_TAP\t1");
        assert!(rows.contains(&"T_NUM_ALL\t2"));
        assert!(rows.contains(&"TTM_SCR_ALL\t1500"));
        assert!(rows.contains(&"TTM_RAT_ACV\t1"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn falls_back_to_default_tempo() {
        let config = Ma2Config::default().with_default_bpm(90.0);
        let text = render_score(&MusicNotesData::default(), &config);
        assert!(text.contains("BPM_DEF\t90.000\t90.000\t90.000\t90.000\r\n"));
        assert!(text.contains("\r\nBPM\t1\t0\t90.000\r\n"));
    }

    #[test]
    fn reading_back_keeps_every_note() {
        let data = chart("(120){8}1-5[4:1]*^7[8:1],Cfh[4:1]/B3,2b,3$,4h[8:3]/5,,6>1[4:1],");
        let text = render_score(&data, &Ma2Config::default());
        let score = parse_score(&text).unwrap();
        assert_eq!(score.notes, data.notes);
        assert_eq!(score.bpms, data.bpms);
        assert_eq!(score.statistics, data.statistics);
        assert_eq!(score.header["COMPATIBLE_CODE"], vec!["MA2".to_string()]);
    }
}
