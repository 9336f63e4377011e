//! Program lookups.

use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::Program;

pub async fn find(exec: impl PgExecutor<'_>, program_id: i64) -> Result<Option<Program>> {
    let row = sqlx::query_as::<_, Program>(
        "SELECT id, code, name FROM programs WHERE id = $1",
    )
    .bind(program_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}
