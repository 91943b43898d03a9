//! Helpers for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use catalogo::db::{DbPool, establish_connection_pool, run_migrations};
use catalogo::domain::category::{Category, NewCategory};
use catalogo::domain::tag::{NewTag, Tag};
use catalogo::repository::{CategoryWriter, DieselRepository, TagWriter};

/// Migrated SQLite database living in its own temporary directory.
pub struct TestDb {
    // Removing the directory also cleans up the -wal/-shm side files.
    dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);
        let url = path.to_str().expect("Temporary path is not UTF-8.");

        let pool = establish_connection_pool(url).expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");

        TestDb { dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

pub fn create_category(repo: &DieselRepository, name: &str) -> Category {
    repo.create_category(&NewCategory::new(name))
        .expect("Failed to create category.")
}

pub fn create_tag(repo: &DieselRepository, name: &str) -> Tag {
    repo.create_tag(&NewTag::new(name))
        .expect("Failed to create tag.")
}
