//! PostgREST row selection
//!
//! A [`Query`] names a table, the columns to return and equality filters. The
//! same value drives `select` (GET) and `update` (PATCH) requests.

use serde_json::Value;

/// A filter operand
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Int(i64),
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::String(s) => write!(f, "{}", s),
            FilterValue::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl FilterValue {
    /// Operand for a JSON key value (row ids come back as numbers or strings)
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FilterValue::String(s.clone())),
            Value::Number(n) => n.as_i64().map(FilterValue::Int),
            _ => None,
        }
    }
}

/// A row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, FilterValue),
}

impl Filter {
    fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", value)),
        }
    }
}

/// Selection of rows from one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub select: Vec<String>,
    pub filters: Vec<Filter>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: Vec::new(),
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Columns to return; all columns when never called
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add an equality filter
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs for a GET request
    pub fn to_select_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let select = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.join(",")
        };
        params.push(("select".to_string(), select));
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Query-string pairs addressing the rows for a PATCH request
    pub fn to_filter_params(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }
}
