use std::path::PathBuf;

use summitprep_core::{
    count_incomplete_rows, count_missing_by_column, drop_column, drop_columns, is_missing,
};
use summitprep_parser::{load, TableError};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../summitprep-parser/tests/data")
        .join(name)
}

#[test]
fn counts_rows_with_missing_values() {
    let road = load(fixture_path("auto_road_2022.csv")).unwrap().table;
    assert_eq!(count_incomplete_rows(&road), 1);

    let missing = count_missing_by_column(&road);
    assert_eq!(
        missing,
        vec![
            ("date".to_string(), 0),
            ("AR43Temperature".to_string(), 0),
            ("AR55Temperature".to_string(), 1),
            ("RoadCondition".to_string(), 0),
        ]
    );
}

#[test]
fn null_markers_count_as_missing() {
    for value in ["", "  ", "NaN", "null", "NA", "n/a"] {
        assert!(is_missing(value), "{value:?} should be missing");
    }
    for value in ["0", "nano", "-99"] {
        assert!(!is_missing(value), "{value:?} should be present");
    }
}

#[test]
fn drops_a_column_without_touching_the_input() {
    let road = load(fixture_path("auto_road_2022.csv")).unwrap().table;
    let trimmed = drop_column(&road, "AR43Temperature").expect("drop failed");

    assert_eq!(
        trimmed.columns(),
        ["date", "AR55Temperature", "RoadCondition"]
    );
    assert_eq!(trimmed.len(), road.len());
    assert_eq!(trimmed.get(0, "AR55Temperature"), Some("20.9"));
    assert!(road.has_column("AR43Temperature"));
}

#[test]
fn missing_column_is_reported() {
    let road = load(fixture_path("auto_road_2022.csv")).unwrap().table;

    assert_eq!(
        drop_column(&road, "AR99Temperature").unwrap_err(),
        TableError::MissingColumn("AR99Temperature".into())
    );
    assert_eq!(
        drop_columns(&road, &["RoadCondition", "nope"]).unwrap_err(),
        TableError::MissingColumn("nope".into())
    );

    let both = drop_columns(&road, &["RoadCondition", "AR43Temperature"]).unwrap();
    assert_eq!(both.columns(), ["date", "AR55Temperature"]);
}
