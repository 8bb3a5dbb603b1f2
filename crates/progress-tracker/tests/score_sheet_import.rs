use std::io::Cursor;

use progress_tracker::workflows::progress::{aggregate, Child, ChildId, RuleConfig};
use progress_tracker::workflows::score_sheet::{ScoreSheetImporter, SkipReason};

fn roster() -> Vec<Child> {
    let mut existing = Child::new(ChildId("c-1".to_string()), "Noah");
    existing.scores = vec![progress_tracker::workflows::progress::ScoreEntry::new(
        chrono::NaiveDate::from_ymd_opt(2024, 11, 1).expect("valid"),
        "Lee",
    )
    .with_score(0, 0)
    .with_score(1, 0)
    .with_score(2, 0)
    .with_score(3, 0)];

    vec![existing, Child::new(ChildId("c-2".to_string()), "Amira")]
}

#[test]
fn imported_sheet_updates_period_statistics() {
    let csv = "Date,Child,Evaluator,Personal Tasks,Shared Spaces,Education,General Attitude,Notes\n\
2024-11-02,Noah,Dana,2,2,2,2,great day\n\
2024-11-03,Noah,Dana,2,1,2,2,\n\
2024-11-01,Noah,Dana,1,1,1,1,\n\
2024-11-03,Unknown Kid,Dana,2,2,2,2,\n";
    let config = RuleConfig::default();

    let outcome = ScoreSheetImporter::from_reader(Cursor::new(csv), &roster(), &config)
        .expect("import succeeds");

    assert_eq!(outcome.applied, 3);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, SkipReason::UnknownChild);
    assert_eq!(outcome.skipped[0].row, 4);

    let noah = &outcome.children[0];
    assert_eq!(noah.scores.len(), 3, "2024-11-01 was replaced, not duplicated");
    assert_eq!(noah.scores[0].evaluator, "Dana");

    let stats = aggregate(noah, &config);
    let overall = stats.overall.expect("overall");
    assert_eq!(overall.total_scores, 12);
    assert!((overall.average - 19.0 / 12.0).abs() < 1e-9);
    assert!(stats.periods[0].as_ref().expect("period").achieved);
}

#[test]
fn sheet_without_required_columns_is_rejected() {
    let csv = "When,Child,Evaluator\n2024-11-02,Noah,Dana\n";

    let err = ScoreSheetImporter::from_reader(Cursor::new(csv), &roster(), &RuleConfig::default())
        .expect_err("missing date column");

    assert_eq!(err.to_string(), "score sheet has no 'date' column");
}
