use std::path::PathBuf;

use summitprep_core::{merge_all, Folded, NamedTable, Precedence};
use summitprep_parser::{load, Table};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../summitprep-parser/tests/data")
        .join(name)
}

fn table(rows: &[(&str, &str)]) -> Table {
    Table::new(
        vec!["date".to_string(), "value".to_string()],
        rows.iter()
            .map(|(t, v)| vec![t.to_string(), v.to_string()])
            .collect(),
    )
    .expect("valid table")
}

fn sources() -> Vec<NamedTable> {
    vec![
        NamedTable::new(
            "first",
            table(&[("2022-01-01 00:00", "1"), ("2022-01-01 00:01", "1")]),
        ),
        NamedTable::new(
            "second",
            table(&[("2022-01-01 00:01", "2"), ("2022-01-01 00:02", "2")]),
        ),
        NamedTable::new(
            "third",
            table(&[("2022-01-01 00:02", "3"), ("2022-01-01 00:03", "3")]),
        ),
    ]
}

#[test]
fn earlier_sources_win_by_default() {
    let Folded::Table { table, steps } =
        merge_all(&sources(), "date", Precedence::default()).expect("fold failed")
    else {
        panic!("expected a table");
    };

    assert_eq!(table.column_values("value").unwrap(), vec!["1", "1", "2", "3"]);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].source, "second");
    assert_eq!(steps[0].stats.dropped_overlap, 1);
    assert_eq!(steps[1].source, "third");
    assert_eq!(steps[1].stats.dropped_overlap, 1);
}

#[test]
fn later_sources_win_when_requested() {
    let table = merge_all(&sources(), "date", Precedence::LaterWins)
        .expect("fold failed")
        .into_table()
        .expect("expected a table");

    assert_eq!(table.column_values("value").unwrap(), vec!["1", "2", "3", "3"]);
}

#[test]
fn single_source_is_sorted_and_normalized() {
    let only = vec![NamedTable::new(
        "only",
        table(&[("2022-01-01T00:02", "b"), ("2022-01-01 00:01", "a")]),
    )];
    let table = merge_all(&only, "date", Precedence::EarlierWins)
        .unwrap()
        .into_table()
        .unwrap();

    assert_eq!(
        table.column_values("date").unwrap(),
        vec!["2022-01-01 00:01:00", "2022-01-01 00:02:00"]
    );
}

#[test]
fn empty_source_stops_the_fold() {
    let mut inputs = sources();
    inputs.insert(
        1,
        NamedTable::new(
            "header_only",
            load(fixture_path("header_only.csv")).unwrap().table,
        ),
    );

    assert_eq!(
        merge_all(&inputs, "date", Precedence::EarlierWins).unwrap(),
        Folded::EmptySource {
            name: "header_only".into()
        }
    );
    assert_eq!(
        merge_all(&[], "date", Precedence::EarlierWins).unwrap(),
        Folded::NoSources
    );
}

#[test]
fn precedence_parses_from_snake_case() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        precedence: Precedence,
    }

    let parsed: Wrapper = serde_json::from_str(r#"{"precedence":"later_wins"}"#).unwrap();
    assert_eq!(parsed.precedence, Precedence::LaterWins);
}
