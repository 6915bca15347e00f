use sqlx::PgPool;

/// Handles the SQL message types in [`crate::entities`] via
/// `kanau::processor::Processor`.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
