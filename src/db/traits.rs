//! Personality trait lookups.

use sqlx::PgExecutor;

use crate::error::Result;
use crate::models::PersonalityTrait;

/// Resolve a trait by its code (e.g. "DI" for a Dominance/Influence profile).
pub async fn find_by_code(
    exec: impl PgExecutor<'_>,
    code: &str,
) -> Result<Option<PersonalityTrait>> {
    let row = sqlx::query_as::<_, PersonalityTrait>(
        "SELECT id, code, label FROM personality_traits WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}
