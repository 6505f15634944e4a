//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared container across all tests for dramatically improved
//! performance. The container and migrations are initialized once on the
//! first test, then reused.

use anyhow::{Context, Result};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use server_core::common::PlayerId;
use server_core::domains::friends::{Friendship, Player};
use server_core::domains::matching::actions;
use server_core::domains::matching::data::SessionData;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Respect RUST_LOG; try_init() avoids panicking if already set up.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    pub(super) async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Each test gets a fresh pool and fresh fixture rows, but reuses the same
/// database container.
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// Create a player with a unique username. The database is shared across
    /// tests, so the prefix gets a random suffix.
    pub async fn player(&self, prefix: &str) -> Player {
        let username = format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8]);
        Player::insert(&username, &self.db_pool)
            .await
            .expect("Failed to insert player")
    }

    pub async fn befriend(&self, a: PlayerId, b: PlayerId) {
        Friendship::insert(a, b, &self.db_pool)
            .await
            .expect("Failed to insert friendship");
    }

    /// Two friends, invitation sent and accepted: a lobby session.
    pub async fn lobby_session(&self, a: PlayerId, b: PlayerId) -> SessionData {
        self.befriend(a, b).await;
        let invitation = actions::invite(a, b, &self.db_pool)
            .await
            .expect("Failed to invite");
        let (_, session) = actions::respond(b, invitation.id, true, &self.db_pool)
            .await
            .expect("Failed to accept");
        session.expect("Acceptance should create a session")
    }

    /// A lobby session with both players already flagged ready.
    pub async fn active_session(&self, a: PlayerId, b: PlayerId) -> SessionData {
        let session = self.lobby_session(a, b).await;
        actions::mark_ready(a, session.id, &self.db_pool)
            .await
            .expect("Failed to mark a ready");
        actions::mark_ready(b, session.id, &self.db_pool)
            .await
            .expect("Failed to mark b ready")
    }
}
