use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates the PostgreSQL connection pool shared by every request
///
/// The pool is owned by the bootstrap layer; the tag store only borrows
/// connections from it for read queries.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}
