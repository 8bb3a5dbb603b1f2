pub mod progress;
pub mod score_sheet;
