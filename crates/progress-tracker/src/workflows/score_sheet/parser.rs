use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;

use super::ScoreSheetImportError;
use crate::workflows::progress::{CategoryIndex, RuleConfig, Score, MAX_SCORE};

const DATE_COLUMN: &str = "date";
const CHILD_COLUMN: &str = "child";
const EVALUATOR_COLUMN: &str = "evaluator";

/// One data row with its score cells resolved to category indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreSheetRow {
    /// 1-based position among data rows; the header row is not counted.
    pub(crate) row: usize,
    pub(crate) date: NaiveDate,
    pub(crate) child: String,
    pub(crate) evaluator: String,
    pub(crate) scores: BTreeMap<CategoryIndex, Score>,
}

#[derive(Debug)]
struct ColumnLayout {
    date: usize,
    child: usize,
    evaluator: usize,
    categories: Vec<(usize, CategoryIndex)>,
}

pub(crate) fn parse_rows<R: Read>(
    reader: R,
    config: &RuleConfig,
) -> Result<Vec<ScoreSheetRow>, ScoreSheetImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let layout = ColumnLayout::from_headers(csv_reader.headers()?, config)?;
    let mut rows = Vec::new();

    for (position, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = position + 1;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = |column: usize| record.get(column).unwrap_or_default();
        let raw_date = cell(layout.date);
        let date = parse_date(raw_date).ok_or_else(|| ScoreSheetImportError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        let mut scores = BTreeMap::new();
        for (column, index) in &layout.categories {
            let value = cell(*column);
            if value.is_empty() {
                continue;
            }
            let score = parse_score(value).ok_or_else(|| ScoreSheetImportError::InvalidScore {
                row,
                column: config.categories[*index].clone(),
                value: value.to_string(),
            })?;
            scores.insert(*index, score);
        }

        rows.push(ScoreSheetRow {
            row,
            date,
            child: cell(layout.child).to_string(),
            evaluator: cell(layout.evaluator).to_string(),
            scores,
        });
    }

    Ok(rows)
}

impl ColumnLayout {
    fn from_headers(
        headers: &csv::StringRecord,
        config: &RuleConfig,
    ) -> Result<Self, ScoreSheetImportError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
                .ok_or(ScoreSheetImportError::MissingColumn(name))
        };

        let date = find(DATE_COLUMN)?;
        let child = find(CHILD_COLUMN)?;
        let evaluator = find(EVALUATOR_COLUMN)?;

        let categories = headers
            .iter()
            .enumerate()
            .filter(|(column, _)| ![date, child, evaluator].contains(column))
            .filter_map(|(column, header)| {
                category_for_header(header, config).map(|index| (column, index))
            })
            .collect();

        Ok(Self {
            date,
            child,
            evaluator,
            categories,
        })
    }
}

fn category_for_header(header: &str, config: &RuleConfig) -> Option<CategoryIndex> {
    let header = header.trim();
    if let Some(index) = config
        .categories
        .iter()
        .position(|name| name.trim().to_lowercase() == header.to_lowercase())
    {
        return Some(index);
    }

    header
        .strip_prefix(['s', 'S'])
        .and_then(|slot| slot.parse::<usize>().ok())
        .filter(|slot| (1..=config.categories.len()).contains(slot))
        .map(|slot| slot - 1)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d.%m.%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_score(value: &str) -> Option<Score> {
    value
        .parse::<Score>()
        .ok()
        .filter(|score| *score <= MAX_SCORE)
}
