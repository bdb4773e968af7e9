//! Postgres and Redis containers shared by the backend tests.
//!
//! Containers start once per test binary and live until it exits. Pools and
//! connections are opened per test, since each `#[tokio::test]` has its own
//! runtime.

use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

struct SharedInfra {
    db_url: String,
    redis_url: String,
    _postgres: ContainerAsync<Postgres>,
    _redis: ContainerAsync<Redis>,
}

static SHARED_INFRA: OnceCell<SharedInfra> = OnceCell::const_new();

async fn infra() -> &'static SharedInfra {
    SHARED_INFRA
        .get_or_init(|| async {
            let postgres = Postgres::default()
                .with_tag("16")
                .start()
                .await
                .expect("Failed to start Postgres container");
            let db_url = format!(
                "postgresql://postgres:postgres@{}:{}/postgres",
                postgres.get_host().await.unwrap(),
                postgres.get_host_port_ipv4(5432).await.unwrap()
            );

            let redis = Redis::default()
                .start()
                .await
                .expect("Failed to start Redis container");
            let redis_url = format!(
                "redis://{}:{}",
                redis.get_host().await.unwrap(),
                redis.get_host_port_ipv4(6379).await.unwrap()
            );

            let pool = PgPool::connect(&db_url).await.unwrap();
            crate::db::run_migrations(&pool)
                .await
                .expect("Failed to run migrations");
            pool.close().await;

            SharedInfra {
                db_url,
                redis_url,
                _postgres: postgres,
                _redis: redis,
            }
        })
        .await
}

/// A fresh pool on the migrated test database.
pub async fn pg_pool() -> PgPool {
    crate::db::create_pool(&infra().await.db_url)
        .await
        .expect("Failed to connect to test database")
}

pub async fn redis_url() -> String {
    infra().await.redis_url.clone()
}
