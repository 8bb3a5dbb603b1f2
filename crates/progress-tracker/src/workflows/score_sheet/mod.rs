//! Historical evaluations imported from a spreadsheet export.

mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::workflows::progress::{Child, RuleConfig, ScoreEntry};

#[derive(Debug)]
pub enum ScoreSheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
    InvalidDate {
        row: usize,
        value: String,
    },
    InvalidScore {
        row: usize,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for ScoreSheetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreSheetImportError::Io(err) => write!(f, "failed to read score sheet: {}", err),
            ScoreSheetImportError::Csv(err) => write!(f, "invalid score sheet CSV data: {}", err),
            ScoreSheetImportError::MissingColumn(column) => {
                write!(f, "score sheet has no '{}' column", column)
            }
            ScoreSheetImportError::InvalidDate { row, value } => {
                write!(f, "row {}: '{}' is not a valid date", row, value)
            }
            ScoreSheetImportError::InvalidScore { row, column, value } => write!(
                f,
                "row {}: '{}' is not a 0-2 score for {}",
                row, value, column
            ),
        }
    }
}

impl std::error::Error for ScoreSheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreSheetImportError::Io(err) => Some(err),
            ScoreSheetImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScoreSheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScoreSheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownChild,
    NoScores,
}

/// A data row that was read but not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub child: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub children: Vec<Child>,
    pub applied: usize,
    pub skipped: Vec<SkippedRow>,
}

pub struct ScoreSheetImporter;

impl ScoreSheetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        children: &[Child],
        config: &RuleConfig,
    ) -> Result<ImportOutcome, ScoreSheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, children, config)
    }

    /// Applies every row to a copy of `children`; later rows for the same child and date win.
    pub fn from_reader<R: Read>(
        reader: R,
        children: &[Child],
        config: &RuleConfig,
    ) -> Result<ImportOutcome, ScoreSheetImportError> {
        let rows = parser::parse_rows(reader, config)?;

        let mut updated = children.to_vec();
        let by_id: HashMap<String, usize> = updated
            .iter()
            .enumerate()
            .map(|(position, child)| (child.id.as_str().to_string(), position))
            .collect();
        let by_name: HashMap<String, usize> = updated
            .iter()
            .enumerate()
            .rev()
            .map(|(position, child)| (child.name.trim().to_lowercase(), position))
            .collect();

        let mut applied = 0;
        let mut skipped = Vec::new();

        for row in rows {
            let position = by_id
                .get(row.child.as_str())
                .or_else(|| by_name.get(&row.child.to_lowercase()))
                .copied();

            let reason = match position {
                None => Some(SkipReason::UnknownChild),
                Some(_) if row.scores.is_empty() => Some(SkipReason::NoScores),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                warn!(row = row.row, child = %row.child, ?reason, "score sheet row skipped");
                skipped.push(SkippedRow {
                    row: row.row,
                    child: row.child,
                    reason,
                });
                continue;
            }

            if let Some(position) = position {
                let entry = ScoreEntry {
                    category_scores: row.scores,
                    ..ScoreEntry::new(row.date, row.evaluator)
                };
                updated[position] = updated[position].with_entry(entry);
                applied += 1;
            }
        }

        info!(applied, skipped = skipped.len(), "score sheet imported");
        Ok(ImportOutcome {
            children: updated,
            applied,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::progress::ChildId;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn children() -> Vec<Child> {
        vec![
            Child::new(ChildId("c-1".to_string()), "Noah"),
            Child::new(ChildId("c-2".to_string()), "Amira"),
        ]
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, day).expect("valid date")
    }

    #[test]
    fn importer_matches_children_by_id_then_name() {
        let csv = "Date,Child,Evaluator,Personal Tasks,Shared Spaces,Education,General Attitude\n\
2024-11-03,c-1,Dana,2,2,1,2\n\
04.11.2024,amira,Dana,1,,0,1\n";

        let outcome =
            ScoreSheetImporter::from_reader(Cursor::new(csv), &children(), &RuleConfig::default())
                .expect("import succeeds");

        assert_eq!(outcome.applied, 2);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.children[0].flattened_scores(), vec![2, 2, 1, 2]);
        let amira = &outcome.children[1].scores[0];
        assert_eq!(amira.date, date(4));
        assert!(!amira.category_scores.contains_key(&1), "empty cell is unscored");
    }

    #[test]
    fn later_rows_replace_earlier_rows_for_the_same_date() {
        let csv = "Date,Child,Evaluator,s1,s2,s3,s4\n\
2024-11-03,Noah,Dana,0,0,0,0\n\
2024-11-02,Noah,Dana,1,1,1,1\n\
2024-11-03,Noah,Lee,2,2,2,2\n";

        let outcome =
            ScoreSheetImporter::from_reader(Cursor::new(csv), &children(), &RuleConfig::default())
                .expect("import succeeds");

        let noah = &outcome.children[0];
        assert_eq!(noah.scores.len(), 2);
        assert_eq!(noah.scores[0].date, date(3));
        assert_eq!(noah.scores[0].evaluator, "Lee");
        assert_eq!(outcome.applied, 3);
    }

    #[test]
    fn unknown_children_and_empty_rows_are_reported() {
        let csv = "Date,Child,Evaluator,Education\n\
2024-11-03,Ghost,Dana,2\n\
2024-11-03,Noah,Dana,\n";

        let outcome =
            ScoreSheetImporter::from_reader(Cursor::new(csv), &children(), &RuleConfig::default())
                .expect("import succeeds");

        assert_eq!(outcome.applied, 0);
        assert_eq!(
            outcome.skipped,
            vec![
                SkippedRow {
                    row: 1,
                    child: "Ghost".to_string(),
                    reason: SkipReason::UnknownChild,
                },
                SkippedRow {
                    row: 2,
                    child: "Noah".to_string(),
                    reason: SkipReason::NoScores,
                },
            ]
        );
        assert_eq!(outcome.children, children());
    }

    #[test]
    fn invalid_cells_carry_the_row_number() {
        let csv = "Date,Child,Evaluator,Education\n\
2024-11-03,Noah,Dana,2\n\
2024-11-04,Noah,Dana,5\n";

        let err =
            ScoreSheetImporter::from_reader(Cursor::new(csv), &children(), &RuleConfig::default())
                .expect_err("score out of range");

        match err {
            ScoreSheetImportError::InvalidScore { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Education");
                assert_eq!(value, "5");
            }
            other => panic!("expected invalid score, got {other:?}"),
        }

        let csv = "Date,Child,Evaluator,Education\nyesterday,Noah,Dana,2\n";
        let err =
            ScoreSheetImporter::from_reader(Cursor::new(csv), &children(), &RuleConfig::default())
                .expect_err("bad date");
        assert_eq!(err.to_string(), "row 1: 'yesterday' is not a valid date");
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = ScoreSheetImporter::from_path(
            "./does-not-exist.csv",
            &children(),
            &RuleConfig::default(),
        )
        .expect_err("expected io error");

        match error {
            ScoreSheetImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
