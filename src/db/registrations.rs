//! Registration rows; only consulted for metadata fallbacks.

use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::Registration;

pub async fn find(
    exec: impl PgExecutor<'_>,
    registration_id: i64,
) -> Result<Option<Registration>> {
    let row = sqlx::query_as::<_, Registration>(
        "SELECT id, user_id, program_id, metadata FROM registrations WHERE id = $1",
    )
    .bind(registration_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}
