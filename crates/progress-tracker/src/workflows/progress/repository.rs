use super::domain::Child;
use super::evaluation::RuleConfig;

/// Whole-document storage for the children list; writes replace the stored list.
pub trait ChildRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<Child>, RepositoryError>;
    fn replace_all(&self, children: Vec<Child>) -> Result<(), RepositoryError>;

    /// Read-modify-write on the stored list. `change` sees the current list and returns the
    /// replacement plus a value for the caller; no other write may land in between. Nothing
    /// is written when `change` fails.
    fn update<T, E, F>(&self, change: F) -> Result<T, E>
    where
        F: FnOnce(&[Child]) -> Result<(Vec<Child>, T), E>,
        E: From<RepositoryError>;
}

/// Storage for the single process-wide rule configuration.
pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> Result<Option<RuleConfig>, RepositoryError>;
    fn store(&self, config: RuleConfig) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
