use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chainhub::adapter::outbound::sqlite::{create_pool, run_migrations, DbPool};
use diesel::prelude::*;

/// Migrated SQLite file for integration tests, removed on drop.
pub struct TempDb {
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        path.push(format!("chainhub-{name}-{nanos}.db"));

        let pool = create_pool(&path.display().to_string(), 2).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        Self { path, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Database URL as the config file expects it.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    /// Run raw SQL, used to seed rows or break tables.
    pub fn exec(&self, sql: &str) {
        let mut conn = self.pool.get().expect("get sqlite connection");
        diesel::sql_query(sql)
            .execute(&mut conn)
            .unwrap_or_else(|e| panic!("{sql}: {e}"));
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
