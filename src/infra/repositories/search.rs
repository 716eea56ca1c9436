//! Helpers for case-insensitive substring search.

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

/// `%term%` in lower case with LIKE wildcards escaped
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

/// `LOWER(column) LIKE '%term%'`
pub(crate) fn icontains<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(contains_pattern(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, PostgresQueryBuilder, Query};

    #[test]
    fn test_wildcards_are_escaped() {
        let sql = Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("cars"))
            .and_where(icontains(Alias::new("description"), "100%_Ok"))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"LOWER("description") LIKE"#), "{}", sql);
        assert!(sql.contains("_ok%'"), "{}", sql);
        assert!(sql.contains("ESCAPE"), "{}", sql);
    }
}
