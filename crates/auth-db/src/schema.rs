//! Schema bootstrap
//!
//! The DDL is idempotent (`IF NOT EXISTS`), so applying it on every start is safe.

use sqlx::PgPool;
use tracing::info;

/// Ordered schema scripts, embedded at compile time
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_user_tenant_lookup",
        include_str!("../migrations/0001_user_tenant_lookup.sql"),
    ),
    ("0002_sessions", include_str!("../migrations/0002_sessions.sql")),
    (
        "0003_token_blacklist",
        include_str!("../migrations/0003_token_blacklist.sql"),
    ),
];

/// Apply every schema script in order
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for (name, sql) in MIGRATIONS {
        sqlx::raw_sql(sql).execute(pool).await?;
        info!(migration = name, "Schema script applied");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<_> = MIGRATIONS.iter().map(|(name, _)| *name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_lookup_has_partial_username_index() {
        let (_, sql) = MIGRATIONS[0];
        assert!(sql.contains("(username, tenant_slug)"));
        assert!(sql.contains("WHERE username IS NOT NULL"));
    }
}
