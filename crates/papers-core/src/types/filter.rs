//! Query specification types passed to entity stores.
//!
//! A [`Query`] is a conjunction of [`FilterField`] conditions. Stores
//! evaluate it either in memory (via [`Query::matches`]) or by translating
//! it into their native query language.

use serde::{Deserialize, Serialize};

use super::path::is_segment_prefix;
use crate::traits::store::Document;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal (a missing field counts as not equal).
    Ne,
    /// Membership in a list of strings.
    In,
    /// The field is a materialized path equal to, or extending by whole
    /// segments, the given path.
    PathPrefix,
    /// The field is absent or null.
    IsNull,
    /// The field is present and not null.
    IsNotNull,
}

/// A dynamic filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for the `In` operator).
    StringList(Vec<String>),
    /// Null / no value (for `IsNull`, `IsNotNull`).
    Null,
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterField {
    /// The column or field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for a string equality filter.
    pub fn eq(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::String(value.to_string()))
    }

    /// Shorthand for a boolean equality filter.
    pub fn is(field: impl Into<String>, value: bool) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::Boolean(value))
    }

    /// Shorthand for a list membership filter.
    pub fn any_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let list = values.into_iter().map(|v| v.to_string()).collect();
        Self::new(field, FilterOp::In, FilterValue::StringList(list))
    }

    /// Shorthand for a segment-aligned path prefix filter.
    pub fn path_prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(field, FilterOp::PathPrefix, FilterValue::String(prefix.into()))
    }

    /// Evaluate the condition against a field value (`None` = field absent).
    pub fn matches(&self, actual: Option<&FilterValue>) -> bool {
        let actual = actual.filter(|v| **v != FilterValue::Null);
        match self.op {
            FilterOp::Eq => actual == Some(&self.value),
            FilterOp::Ne => actual != Some(&self.value),
            FilterOp::In => match (&self.value, actual) {
                (FilterValue::StringList(list), Some(FilterValue::String(s))) => list.contains(s),
                _ => false,
            },
            FilterOp::PathPrefix => match (&self.value, actual) {
                (FilterValue::String(prefix), Some(FilterValue::String(path))) => {
                    is_segment_prefix(prefix, path)
                }
                _ => false,
            },
            FilterOp::IsNull => actual.is_none(),
            FilterOp::IsNotNull => actual.is_some(),
        }
    }
}

/// A conjunction of filter conditions. An empty query matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    /// Conditions that must all hold.
    pub filters: Vec<FilterField>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition.
    pub fn and(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Evaluate the query against a document.
    pub fn matches<D: Document>(&self, doc: &D) -> bool {
        self.filters
            .iter()
            .all(|f| f.matches(doc.field(&f.field).as_ref()))
    }
}
