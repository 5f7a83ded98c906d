use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use ephemail_core::AppResult;
use ephemail_domain::{CleanupFilter, CleanupTarget};

/// Builds the parameterized `DELETE` for a non-empty, validated filter.
pub(super) fn delete_statement(
    filter: &CleanupFilter,
    now: DateTime<Utc>,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let (table, address_column) = target_columns(filter.target);

    let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new("DELETE FROM ");
    builder.push(table);
    builder.push(" WHERE TRUE");

    if let Some(window) = filter.window() {
        builder.push(" AND created_at < ");
        builder.push_bind(window.cutoff(now)?);
    }

    if let Some(prefix) = filter.address_prefix.as_deref() {
        builder.push(" AND ");
        builder.push(address_column);
        builder.push(" LIKE ");
        builder.push_bind(format!("{}%", escape_like(prefix)));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(suffix) = filter.address_suffix.as_deref() {
        builder.push(" AND ");
        builder.push(address_column);
        builder.push(" LIKE ");
        builder.push_bind(format!("%{}", escape_like(suffix)));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(needle) = filter.raw_contains.as_deref()
        && filter.target.has_raw_content()
    {
        builder.push(" AND raw LIKE ");
        builder.push_bind(format!("%{}%", escape_like(needle)));
        builder.push(" ESCAPE '\\'");
    }

    Ok(builder)
}

fn target_columns(target: CleanupTarget) -> (&'static str, &'static str) {
    match target {
        CleanupTarget::Mails => ("raw_mails", "address"),
        CleanupTarget::Sendbox => ("sendbox", "address"),
        CleanupTarget::Address => ("address", "name"),
    }
}

/// Escapes `LIKE` wildcards so the value matches literally.
pub(super) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use ephemail_core::AppResult;
use ephemail_domain::{CleanupFilter, CleanupTarget};

    use super::{delete_statement, escape_like};

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn statement_binds_every_condition() {
        let filter = CleanupFilter {
            target: CleanupTarget::Sendbox,
            older_than_days: Some(3),
            address_prefix: Some("bot-".to_owned()),
            address_suffix: Some("@spam.example".to_owned()),
            raw_contains: Some("unsubscribe".to_owned()),
        };

        let builder = delete_statement(&filter, Utc::now())
            .unwrap_or_else(|error| panic!("statement should build: {error}"));
        let sql = builder.sql();

        assert!(sql.starts_with("DELETE FROM sendbox WHERE TRUE"));
        assert!(sql.contains("created_at < $1"));
        assert!(sql.contains("address LIKE $2"));
        assert!(sql.contains("address LIKE $3"));
        assert!(sql.contains("raw LIKE $4"));
        assert!(!sql.contains("unsubscribe"));
    }

    #[test]
    fn address_target_filters_on_name_column() {
        let filter = CleanupFilter {
            target: CleanupTarget::Address,
            address_suffix: Some("@old.example".to_owned()),
            ..CleanupFilter::default()
        };

        let builder = delete_statement(&filter, Utc::now())
            .unwrap_or_else(|error| panic!("statement should build: {error}"));

        assert_eq!(
            builder.sql(),
            "DELETE FROM address WHERE TRUE AND name LIKE $1 ESCAPE '\\'"
        );
    }
}
