use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::progress::domain::{Child, ChildId, Score, ScoreEntry};
use crate::workflows::progress::evaluation::{CancelRule, Period, RuleConfig, VetoRule};
use crate::workflows::progress::repository::{
    ChildRepository, RepositoryError, SettingsRepository,
};
use crate::workflows::progress::{progress_router, ProgressService};

pub(super) fn day(value: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, value).expect("valid date")
}

pub(super) fn plain_config() -> RuleConfig {
    RuleConfig::default()
}

pub(super) fn cancel_config() -> RuleConfig {
    RuleConfig {
        cancel_rule: CancelRule {
            enabled: true,
            high_score: 2,
            high_count: 2,
            low_score: 0,
            low_count: 1,
        },
        ..RuleConfig::default()
    }
}

pub(super) fn veto_config(zero_count: u32) -> RuleConfig {
    RuleConfig {
        veto_rule: VetoRule {
            enabled: true,
            zero_count,
        },
        ..cancel_config()
    }
}

pub(super) fn single_period(days: u32, name: &str) -> RuleConfig {
    RuleConfig {
        periods: vec![Period {
            days,
            name: name.to_string(),
        }],
        ..RuleConfig::default()
    }
}

/// Builds a full entry: one score per default category.
pub(super) fn entry(date: NaiveDate, scores: [Score; 4]) -> ScoreEntry {
    scores
        .iter()
        .enumerate()
        .fold(ScoreEntry::new(date, "Dana"), |entry, (index, score)| {
            entry.with_score(index, *score)
        })
}

pub(super) fn child(id: &str, name: &str, entries: Vec<ScoreEntry>) -> Child {
    let mut child = Child::new(ChildId(id.to_string()), name);
    child.scores = entries;
    child
}

pub(super) fn roster() -> Vec<Child> {
    let mut archived = child("c-3", "Bea", vec![entry(day(1), [0, 0, 0, 0])]);
    archived.archived = true;

    vec![
        child(
            "c-1",
            "Noah",
            vec![entry(day(2), [2, 2, 2, 1]), entry(day(1), [2, 1, 2, 2])],
        ),
        child("c-2", "amira", vec![entry(day(2), [1, 0, 1, 1])]),
        archived,
        child("c-4", "Zed", Vec::new()),
    ]
}

#[derive(Default)]
pub(super) struct MemoryChildren {
    children: Mutex<Vec<Child>>,
}

impl MemoryChildren {
    pub(super) fn with(children: Vec<Child>) -> Self {
        Self {
            children: Mutex::new(children),
        }
    }

    pub(super) fn snapshot(&self) -> Vec<Child> {
        self.children.lock().expect("lock").clone()
    }
}

impl ChildRepository for MemoryChildren {
    fn load_all(&self) -> Result<Vec<Child>, RepositoryError> {
        Ok(self.children.lock().expect("lock").clone())
    }

    fn replace_all(&self, children: Vec<Child>) -> Result<(), RepositoryError> {
        *self.children.lock().expect("lock") = children;
        Ok(())
    }

    fn update<T, E, F>(&self, change: F) -> Result<T, E>
    where
        F: FnOnce(&[Child]) -> Result<(Vec<Child>, T), E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.children.lock().expect("lock");
        let (children, value) = change(guard.as_slice())?;
        *guard = children;
        Ok(value)
    }
}

#[derive(Default)]
pub(super) struct MemorySettings {
    config: Mutex<Option<RuleConfig>>,
}

impl MemorySettings {
    pub(super) fn with(config: RuleConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }

    pub(super) fn stored(&self) -> Option<RuleConfig> {
        self.config.lock().expect("lock").clone()
    }
}

impl SettingsRepository for MemorySettings {
    fn load(&self) -> Result<Option<RuleConfig>, RepositoryError> {
        Ok(self.config.lock().expect("lock").clone())
    }

    fn store(&self, config: RuleConfig) -> Result<(), RepositoryError> {
        *self.config.lock().expect("lock") = Some(config);
        Ok(())
    }
}

pub(super) struct UnavailableChildren;

impl ChildRepository for UnavailableChildren {
    fn load_all(&self) -> Result<Vec<Child>, RepositoryError> {
        Err(RepositoryError::Unavailable("children offline".to_string()))
    }

    fn replace_all(&self, _children: Vec<Child>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("children offline".to_string()))
    }

    fn update<T, E, F>(&self, _change: F) -> Result<T, E>
    where
        F: FnOnce(&[Child]) -> Result<(Vec<Child>, T), E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("children offline".to_string()).into())
    }
}

pub(super) type MemoryService = ProgressService<MemoryChildren, MemorySettings>;

pub(super) fn build_service(
    children: Vec<Child>,
    config: RuleConfig,
) -> (MemoryService, Arc<MemoryChildren>, Arc<MemorySettings>) {
    let repository = Arc::new(MemoryChildren::with(children));
    let settings = Arc::new(MemorySettings::with(config));
    let service = ProgressService::new(repository.clone(), settings.clone());
    (service, repository, settings)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    progress_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
