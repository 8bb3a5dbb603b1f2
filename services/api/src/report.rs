use clap::Args;
use progress_tracker::error::AppError;
use progress_tracker::workflows::progress::{
    aggregate, Child, ChildId, ChildStats, CohortReport, DataSnapshot, ProgressServiceError,
    RosterError, RuleConfig,
};
use progress_tracker::workflows::score_sheet::{ScoreSheetImporter, SkipReason};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct StatsArgs {
    /// Data snapshot (settings and children) to read
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Limit the output to one child id
    #[arg(long)]
    pub(crate) child: Option<String>,
    /// Include archived children in the listing
    #[arg(long)]
    pub(crate) include_archived: bool,
}

#[derive(Args, Debug)]
pub(crate) struct MigrateArgs {
    /// Snapshot to convert; current snapshots are written back unchanged
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the converted snapshot
    #[arg(long)]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Data snapshot to merge into
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// CSV score sheet with Date, Child, Evaluator and category columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Destination for the merged snapshot
    #[arg(long)]
    pub(crate) output: PathBuf,
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let StatsArgs {
        data,
        child,
        include_archived,
    } = args;

    let resolved = DataSnapshot::from_path(&data)?;
    let DataSnapshot { settings, children } = resolved.snapshot;
    if resolved.migrated {
        println!("Note: {} uses the legacy 1-5 schema; converted in memory", data.display());
    }

    match child {
        Some(id) => {
            let id = ChildId(id);
            let child = children
                .iter()
                .find(|child| child.id == id)
                .ok_or_else(|| ProgressServiceError::from(RosterError::UnknownChild(id)))?;
            render_child(child, &aggregate(child, &settings), &settings);
        }
        None => {
            let selected = children
                .iter()
                .filter(|child| include_archived || !child.archived);
            render_cohort(&CohortReport::build(selected, &settings));
        }
    }

    Ok(())
}

pub(crate) fn run_migrate(args: MigrateArgs) -> Result<(), AppError> {
    let resolved = DataSnapshot::from_path(&args.input)?;
    write_snapshot(&args.output, &resolved.snapshot)?;

    if resolved.migrated {
        println!(
            "Migrated {} children and {} categories to the 0-2 scale",
            resolved.snapshot.children.len(),
            resolved.snapshot.settings.categories.len()
        );
    } else {
        println!("Snapshot already uses the current schema; copied unchanged");
    }
    println!("Wrote {}", args.output.display());
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let resolved = DataSnapshot::from_path(&args.data)?;
    let DataSnapshot { settings, children } = resolved.snapshot;

    let outcome = ScoreSheetImporter::from_path(&args.csv, &children, &settings)?;
    println!(
        "Imported {} rows from {}",
        outcome.applied,
        args.csv.display()
    );
    if outcome.skipped.is_empty() {
        println!("Skipped rows: none");
    } else {
        println!("Skipped rows");
        for skipped in &outcome.skipped {
            let reason = match skipped.reason {
                SkipReason::UnknownChild => "unknown child",
                SkipReason::NoScores => "no scores",
            };
            println!("  - row {}: {} ({})", skipped.row, skipped.child, reason);
        }
    }

    write_snapshot(
        &args.output,
        &DataSnapshot {
            settings,
            children: outcome.children,
        },
    )?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn write_snapshot(path: &Path, snapshot: &DataSnapshot) -> Result<(), AppError> {
    let json = snapshot.to_json_pretty()?;
    std::fs::write(path, json)?;
    Ok(())
}

fn render_child(child: &Child, stats: &ChildStats, settings: &RuleConfig) {
    println!("{} ({})", child.name, child.id);
    if child.archived {
        println!("  Archived");
    }
    println!("  Evaluations: {}", child.scores.len());
    match stats.overall {
        Some(overall) if overall.veto_applied => println!(
            "  Overall: vetoed ({} zeros remaining)",
            overall.remaining_zeros
        ),
        Some(overall) => println!(
            "  Overall: {:.2} over {} scores (threshold {:.2}, {})",
            overall.average,
            overall.total_scores,
            settings.threshold,
            if stats.overall_achieved(settings.threshold) {
                "achieved"
            } else {
                "in progress"
            }
        ),
        None => println!("  Overall: no data"),
    }

    for (period, outcome) in settings.periods.iter().zip(&stats.periods) {
        match outcome {
            Some(outcome) => println!(
                "  {}: {:.2} over {} of {} days{}",
                period.name,
                outcome.result.average,
                outcome.days_count,
                period.days,
                if outcome.achieved { " - achieved" } else { "" }
            ),
            None => println!("  {}: no data", period.name),
        }
    }
}

fn render_cohort(report: &CohortReport) {
    println!("Progress summary (threshold {:.2})", report.threshold);
    if report.children.is_empty() {
        println!("Children: none");
        return;
    }

    println!("\nChildren");
    for row in &report.children {
        let average = row
            .overall
            .map(|overall| format!("{:.2}", overall.average))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  - {} [{}]: {} ({} evaluations)",
            row.name, row.status_label, average, row.evaluations
        );
    }

    println!("\nCategory averages");
    for category in &report.categories {
        match category.average {
            Some(average) => println!(
                "  - {}: {:.2} ({} scores)",
                category.name, average, category.scored
            ),
            None => println!("  - {}: no scores", category.name),
        }
    }

    if !report.periods.is_empty() {
        println!("\nPeriod achievement");
        for period in &report.periods {
            println!(
                "  - {}: {}/{} achieved",
                period.name, period.achieved, period.evaluated
            );
        }
    }
}
