//! Store harness shared by the adapter behaviour suites.
//!
//! Each suite runs its cases against both the in-memory document store and
//! the Diesel adapters on an embedded PostgreSQL cluster, so the two
//! implementations are held to the same contract. Every PostgreSQL case
//! gets its own migrated temporary database.
//!
//! Cluster setup failures panic unless `SKIP_TEST_CLUSTER` is truthy, in
//! which case the PostgreSQL cases are skipped.

use std::future::Future;
use std::sync::Arc;

use backend::domain::ports::{PostRepository, UserRepository};
use backend::outbound::memory::{InMemoryPostRepository, InMemoryUserRepository};
use backend::outbound::persistence::{
    DbPool, DieselPostRepository, DieselUserRepository, MIGRATIONS, PoolConfig,
};
use backend::test_support::MutableClock;
use chrono::{DateTime, TimeZone, Utc};
use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::MigrationHarness;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use tokio::runtime::Runtime;

/// Storage implementation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Memory,
    Postgres,
}

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Instant every harness clock starts at.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn provision_database() -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("shared cluster: {err:?}"))?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("temporary database: {err:?}"))?;
    let mut conn = PgConnection::establish(&database.url().to_string())
        .map_err(|err| format!("connect for migrations: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migrations: {err}"))?;
    Ok(database)
}

/// Repositories for one test case plus the runtime that drives them.
///
/// Field order matters: the runtime shuts down before the temporary
/// database is dropped, so no pooled connection outlives it.
pub struct Stores {
    runtime: Runtime,
    pub clock: Arc<MutableClock>,
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    database_url: Option<String>,
    _database: Option<TemporaryDatabase>,
}

impl Stores {
    /// Build the stores, or `None` when the cluster is unavailable and
    /// skipping is allowed.
    pub fn start(adapter: Adapter) -> Option<Self> {
        let runtime = Runtime::new().expect("tokio runtime");
        let clock = Arc::new(MutableClock::new(epoch()));
        match adapter {
            Adapter::Memory => Some(Self {
                runtime,
                posts: Arc::new(InMemoryPostRepository::with_clock(clock.clone())),
                users: Arc::new(InMemoryUserRepository::with_clock(clock.clone())),
                clock,
                database_url: None,
                _database: None,
            }),
            Adapter::Postgres => {
                let database = match provision_database() {
                    Ok(database) => database,
                    Err(reason) => return handle_cluster_setup_failure(reason),
                };
                let url = database.url().to_string();
                let config = PoolConfig::new(url.as_str())
                    .with_max_size(8)
                    .with_min_idle(Some(1));
                let pool = runtime
                    .block_on(DbPool::new(config))
                    .expect("connection pool");
                Some(Self {
                    runtime,
                    posts: Arc::new(DieselPostRepository::with_clock(pool.clone(), clock.clone())),
                    users: Arc::new(DieselUserRepository::with_clock(pool, clock.clone())),
                    clock,
                    database_url: Some(url),
                    _database: Some(database),
                })
            }
        }
    }

    /// Drive `future` to completion on this case's runtime.
    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Blocking connection for seeding rows no port writes; `None` for the
    /// in-memory adapter.
    pub fn direct_connection(&self) -> Option<PgConnection> {
        self.database_url
            .as_deref()
            .map(|url| PgConnection::establish(url).expect("direct connection"))
    }
}
