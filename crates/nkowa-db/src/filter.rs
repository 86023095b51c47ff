//! Parameterized WHERE clause construction for list queries.

use uuid::Uuid;

use crate::escape_like;

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Uuid(Uuid),
    Int(i64),
    Bool(bool),
    String(String),
}

/// Bind a slice of [`QueryParam`]s onto a `sqlx` query in order.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut q = $query;
        for param in $params {
            q = match param {
                $crate::filter::QueryParam::Uuid(id) => q.bind(*id),
                $crate::filter::QueryParam::Int(val) => q.bind(*val),
                $crate::filter::QueryParam::Bool(b) => q.bind(*b),
                $crate::filter::QueryParam::String(s) => q.bind(s.clone()),
            };
        }
        q
    }};
}
pub(crate) use bind_params;

/// Accumulates AND-ed conditions with `$n` placeholders numbered from 1.
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    params: Vec<QueryParam>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition. Every `{}` in `template` becomes the placeholder for `param`.
    pub fn push(&mut self, template: &str, param: QueryParam) {
        let placeholder = format!("${}", self.params.len() + 1);
        self.conditions.push(template.replace("{}", &placeholder));
        self.params.push(param);
    }

    /// Add a parameterless condition.
    pub fn push_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    /// Add a case-insensitive substring match against `template`'s placeholder.
    pub fn push_contains(&mut self, template: &str, needle: &str) {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        self.push(template, QueryParam::String(pattern));
    }

    /// `WHERE ...` or an empty string when there are no conditions.
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// Placeholder index the next appended parameter would receive.
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }
}
