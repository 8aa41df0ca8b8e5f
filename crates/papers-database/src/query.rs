//! Translation of [`Query`] conditions into PostgreSQL `WHERE` clauses.
//!
//! Only columns named by a repository's [`ColumnLookup`] can be filtered
//! on; unknown field names are rejected instead of being spliced into SQL.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use papers_core::error::AppError;
use papers_core::result::AppResult;
use papers_core::types::path::SEGMENT_SEPARATOR;
use papers_core::types::{FilterField, FilterOp, FilterValue, Query};

/// SQL type of a filterable column, used to bind values correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Bool,
    BigInt,
}

/// Maps a document field name to its column name and type.
pub type ColumnLookup = fn(&str) -> Option<(&'static str, ColumnType)>;

/// Append `WHERE ...` for `query` to `builder`. An empty query adds nothing.
pub fn push_where(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &Query,
    lookup: ColumnLookup,
) -> AppResult<()> {
    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(builder, filter, lookup)?;
    }
    Ok(())
}

fn push_condition(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &FilterField,
    lookup: ColumnLookup,
) -> AppResult<()> {
    let (column, ty) = lookup(&filter.field).ok_or_else(|| {
        AppError::validation(format!("Cannot filter on unknown field '{}'", filter.field))
    })?;

    match filter.op {
        FilterOp::IsNull => {
            builder.push(column).push(" IS NULL");
        }
        FilterOp::IsNotNull => {
            builder.push(column).push(" IS NOT NULL");
        }
        FilterOp::Eq | FilterOp::Ne => {
            // Ne must also match NULL columns, like a missing field in memory.
            let op = if filter.op == FilterOp::Eq {
                " = "
            } else {
                " IS DISTINCT FROM "
            };
            if filter.value == FilterValue::Null {
                builder.push(column).push(if filter.op == FilterOp::Eq {
                    " IS NULL"
                } else {
                    " IS NOT NULL"
                });
                return Ok(());
            }
            builder.push(column).push(op);
            push_scalar(builder, &filter.field, ty, &filter.value)?;
        }
        FilterOp::In => {
            let FilterValue::StringList(values) = &filter.value else {
                return Err(type_mismatch(&filter.field));
            };
            builder.push(column).push(" = ANY(");
            match ty {
                ColumnType::Uuid => {
                    let ids: Vec<Uuid> = values.iter().filter_map(|v| v.parse().ok()).collect();
                    builder.push_bind(ids);
                }
                ColumnType::Text => {
                    builder.push_bind(values.clone());
                }
                _ => return Err(type_mismatch(&filter.field)),
            }
            builder.push(")");
        }
        FilterOp::PathPrefix => {
            let (FilterValue::String(prefix), ColumnType::Text) = (&filter.value, ty) else {
                return Err(type_mismatch(&filter.field));
            };
            if prefix.is_empty() {
                builder.push("FALSE");
                return Ok(());
            }
            let pattern = format!("{}{}%", escape_like(prefix), SEGMENT_SEPARATOR);
            builder
                .push("(")
                .push(column)
                .push(" = ")
                .push_bind(prefix.clone())
                .push(" OR ")
                .push(column)
                .push(" LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
    Ok(())
}

fn push_scalar(
    builder: &mut QueryBuilder<'_, Postgres>,
    field: &str,
    ty: ColumnType,
    value: &FilterValue,
) -> AppResult<()> {
    match (ty, value) {
        (ColumnType::Uuid, FilterValue::String(s)) => match s.parse::<Uuid>() {
            Ok(id) => {
                builder.push_bind(id);
            }
            // No row has a non-uuid id; bind NULL so `=` matches nothing.
            Err(_) => {
                builder.push_bind(Option::<Uuid>::None);
            }
        },
        (ColumnType::Text, FilterValue::String(s)) => {
            builder.push_bind(s.clone());
        }
        (ColumnType::Bool, FilterValue::Boolean(b)) => {
            builder.push_bind(*b);
        }
        (ColumnType::BigInt, FilterValue::Integer(n)) => {
            builder.push_bind(*n);
        }
        _ => return Err(type_mismatch(field)),
    }
    Ok(())
}

fn type_mismatch(field: &str) -> AppError {
    AppError::validation(format!("Filter value does not match the type of field '{field}'"))
}

/// Escape `LIKE` wildcards so the prefix is matched literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(field: &str) -> Option<(&'static str, ColumnType)> {
        match field {
            "id" => Some(("id", ColumnType::Uuid)),
            "parent_id" => Some(("parent_id", ColumnType::Text)),
            "status" => Some(("status", ColumnType::Bool)),
            "tag" => Some(("tag", ColumnType::Text)),
            _ => None,
        }
    }

    fn render(query: &Query) -> AppResult<String> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM nodes");
        push_where(&mut builder, query, lookup)?;
        Ok(builder.sql().to_string())
    }

    #[test]
    fn test_empty_query_has_no_where() {
        assert_eq!(render(&Query::new()).expect("sql"), "SELECT * FROM nodes");
    }

    #[test]
    fn test_conditions_are_joined_with_and() {
        let q = Query::new()
            .and(FilterField::eq("parent_id", "0"))
            .and(FilterField::is("status", true))
            .and(FilterField::path_prefix("tag", "a#1"));
        assert_eq!(
            render(&q).expect("sql"),
            "SELECT * FROM nodes WHERE parent_id = $1 AND status = $2 AND (tag = $3 OR tag LIKE $4)"
        );
    }

    #[test]
    fn test_in_uses_any() {
        let q = Query::new().and(FilterField::any_of("id", [Uuid::now_v7()]));
        assert_eq!(
            render(&q).expect("sql"),
            "SELECT * FROM nodes WHERE id = ANY($1)"
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let q = Query::new().and(FilterField::eq("password", "x"));
        assert!(render(&q).is_err());
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let q = Query::new().and(FilterField::eq("status", "yes"));
        assert!(render(&q).is_err());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c"), "a\\_b\\%c");
    }
}
