use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::RunQueryDsl;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// How long a caller may wait for a free connection before the pool gives up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on any single statement, so a checkout transaction can never
/// hold its product row locks indefinitely.
const STATEMENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct StatementTimeout(Duration);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query(format!("SET statement_timeout = {}", self.0.as_millis()))
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        Ok(())
    }
}

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .connection_timeout(ACQUIRE_TIMEOUT)
        .connection_customizer(Box::new(StatementTimeout(STATEMENT_TIMEOUT)))
        .build(manager)
        .expect("Failed to create database connection pool")
}
