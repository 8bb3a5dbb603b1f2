use metrics_exporter_prometheus::PrometheusHandle;
use progress_tracker::workflows::progress::{
    Child, ChildRepository, RepositoryError, RuleConfig, SettingsRepository,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn poisoned(document: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{document} mutex poisoned"))
}

/// Children document held in memory; every write replaces the whole list under one lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryChildRepository {
    children: Arc<Mutex<Vec<Child>>>,
}

impl ChildRepository for InMemoryChildRepository {
    fn load_all(&self) -> Result<Vec<Child>, RepositoryError> {
        let guard = self.children.lock().map_err(|_| poisoned("children"))?;
        Ok(guard.clone())
    }

    fn replace_all(&self, children: Vec<Child>) -> Result<(), RepositoryError> {
        let mut guard = self.children.lock().map_err(|_| poisoned("children"))?;
        *guard = children;
        Ok(())
    }

    fn update<T, E, F>(&self, change: F) -> Result<T, E>
    where
        F: FnOnce(&[Child]) -> Result<(Vec<Child>, T), E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.children.lock().map_err(|_| poisoned("children"))?;
        let (children, value) = change(guard.as_slice())?;
        *guard = children;
        Ok(value)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySettingsRepository {
    config: Arc<Mutex<Option<RuleConfig>>>,
}

impl SettingsRepository for InMemorySettingsRepository {
    fn load(&self) -> Result<Option<RuleConfig>, RepositoryError> {
        let guard = self.config.lock().map_err(|_| poisoned("settings"))?;
        Ok(guard.clone())
    }

    fn store(&self, config: RuleConfig) -> Result<(), RepositoryError> {
        let mut guard = self.config.lock().map_err(|_| poisoned("settings"))?;
        *guard = Some(config);
        Ok(())
    }
}
