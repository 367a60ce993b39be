//! Structured document queries.
//!
//! A [`DocumentQuery`] is a conjunction of simple conditions on top-level
//! document properties. The REST backend renders it to a parameterized SQL
//! query; the in-memory backend evaluates it directly with
//! [`DocumentQuery::matches`]. Values are always bound as parameters, never
//! spliced into the query text.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `c.field = @p`
    Eq,
    /// `c.field < @p`
    Lt,
    /// `ARRAY_CONTAINS(@p, c.field)`
    In,
}

/// A single `field <op> value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: &'static str,
    pub operator: Operator,
    pub value: Value,
}

/// Conjunction of conditions. An empty query selects every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    conditions: Vec<Condition>,
}

impl DocumentQuery {
    /// Query selecting every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field,
            operator: Operator::Eq,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn lt(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field,
            operator: Operator::Lt,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn is_in<I, V>(mut self, field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(Condition {
            field,
            operator: Operator::In,
            value: Value::Array(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Renders the query as parameterized SQL.
    #[must_use]
    pub fn to_sql(&self) -> SqlQuerySpec {
        let mut query = String::from("SELECT * FROM c");
        let mut parameters = Vec::with_capacity(self.conditions.len());

        for (i, condition) in self.conditions.iter().enumerate() {
            let name = format!("@p{i}");
            query.push_str(if i == 0 { " WHERE " } else { " AND " });
            match condition.operator {
                Operator::Eq => query.push_str(&format!("c.{} = {name}", condition.field)),
                Operator::Lt => query.push_str(&format!("c.{} < {name}", condition.field)),
                Operator::In => {
                    query.push_str(&format!("ARRAY_CONTAINS({name}, c.{})", condition.field))
                }
            }
            parameters.push(SqlParameter {
                name,
                value: condition.value.clone(),
            });
        }

        SqlQuerySpec { query, parameters }
    }

    /// Evaluates the query against a document.
    ///
    /// Missing properties never match, and `Lt` only compares values of the
    /// same JSON type (strings lexically, numbers numerically).
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|condition| {
            let Some(actual) = document.get(condition.field) else {
                return false;
            };
            match condition.operator {
                Operator::Eq => actual == &condition.value,
                Operator::Lt => compare(actual, &condition.value) == Some(Ordering::Less),
                Operator::In => condition
                    .value
                    .as_array()
                    .is_some_and(|values| values.contains(actual)),
            }
        })
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        _ => None,
    }
}

/// Query body accepted by the REST API (`application/query+json`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuerySpec {
    pub query: String,
    pub parameters: Vec<SqlParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_sql() {
        let sql = DocumentQuery::all()
            .eq("subjectId", "alice")
            .eq("clientId", "web")
            .to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM c WHERE c.subjectId = @p0 AND c.clientId = @p1"
        );
        assert_eq!(sql.parameters[0].name, "@p0");
        assert_eq!(sql.parameters[1].value, json!("web"));
    }

    #[test]
    fn test_to_sql_in_and_lt() {
        let sql = DocumentQuery::all()
            .is_in("name", ["openid", "profile"])
            .lt("expiration", "2024-01-01T00:00:00.0000000Z")
            .to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM c WHERE ARRAY_CONTAINS(@p0, c.name) AND c.expiration < @p1"
        );
        assert_eq!(sql.parameters[0].value, json!(["openid", "profile"]));
    }

    #[test]
    fn test_empty_query_selects_all() {
        assert_eq!(DocumentQuery::all().to_sql().query, "SELECT * FROM c");
        assert!(DocumentQuery::all().matches(&json!({"id": "1"})));
    }

    #[test]
    fn test_matches() {
        let doc = json!({"subjectId": "alice", "expiration": "2024-01-01T00:00:00.0000000Z"});

        assert!(DocumentQuery::all().eq("subjectId", "alice").matches(&doc));
        assert!(!DocumentQuery::all().eq("subjectId", "bob").matches(&doc));
        assert!(
            DocumentQuery::all()
                .lt("expiration", "2024-06-01T00:00:00.0000000Z")
                .matches(&doc)
        );
        assert!(
            !DocumentQuery::all()
                .lt("expiration", "2023-06-01T00:00:00.0000000Z")
                .matches(&doc)
        );
        assert!(
            DocumentQuery::all()
                .is_in("subjectId", ["bob", "alice"])
                .matches(&doc)
        );
    }

    #[test]
    fn test_missing_or_mismatched_field_never_matches() {
        let doc = json!({"subjectId": "alice", "n": 5});
        assert!(!DocumentQuery::all().lt("expiration", "z").matches(&doc));
        assert!(!DocumentQuery::all().lt("n", "9").matches(&doc));
        assert!(DocumentQuery::all().lt("n", 9).matches(&doc));
    }
}
