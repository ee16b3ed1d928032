//! Integration tests for the infrastructure components
//!
//! These tests need a reachable PostgreSQL instance (`DATABASE_URL`) and are
//! ignored by default. Run them with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool};
use serial_test::serial;
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
#[serial]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_init_pool_rejects_malformed_url() {
    let config = DatabaseConfig {
        database_url: "not a url".to_string(),
        max_connections: 1,
        min_connections: 0,
        connection_timeout: 1,
    };

    let result = init_pool(&config).await;
    assert!(matches!(
        result,
        Err(common::error::DatabaseError::Configuration(_))
    ));
}
