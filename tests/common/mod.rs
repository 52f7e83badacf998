use bookkeeper::models::{Budget, Category, Expense};
use bookkeeper::{SqliteRepository, StoreConfig};
use tempfile::TempDir;

pub struct Ledger {
    // Keeps the database directory alive for the test's duration.
    pub _dir: TempDir,
    pub config: StoreConfig,
    pub categories: SqliteRepository<Category>,
    pub expenses: SqliteRepository<Expense>,
    pub budgets: SqliteRepository<Budget>,
}

pub fn ledger() -> anyhow::Result<Ledger> {
    ledger_with(|config| config)
}

pub fn ledger_with(tune: impl FnOnce(StoreConfig) -> StoreConfig) -> anyhow::Result<Ledger> {
    let dir = TempDir::new()?;
    let config = tune(StoreConfig::new(dir.path().join("bookkeeper.db")));
    Ok(Ledger {
        categories: SqliteRepository::new(config.clone())?,
        expenses: SqliteRepository::new(config.clone())?,
        budgets: SqliteRepository::new(config.clone())?,
        config,
        _dir: dir,
    })
}
