use regex::Regex;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A resolved filter value, ready to persist in a session or bind to a query.
///
/// Raw request strings go through an explicit parsing step: blanks collapse to
/// `Absent`, integer-looking strings become `Int`, everything else stays
/// `Text`. Sequences keep their non-blank entries as `Many`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Absent,
    Text(String),
    Int(i64),
    Many(Vec<String>),
}

fn int_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("static pattern compiles"))
}

impl FilterValue {
    /// Parse a raw request string. Blank input clears the value.
    pub fn from_raw(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return FilterValue::Absent;
        }
        if int_pattern().is_match(s) {
            // Overflowing literals stay text rather than erroring.
            if let Ok(n) = s.parse::<i64>() {
                return FilterValue::Int(n);
            }
        }
        FilterValue::Text(s.to_string())
    }

    /// Parse a raw sequence, dropping blank entries. An emptied sequence
    /// clears the value.
    pub fn from_list<S: AsRef<str>>(items: &[S]) -> Self {
        let kept: Vec<String> = items
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if kept.is_empty() {
            FilterValue::Absent
        } else {
            FilterValue::Many(kept)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FilterValue::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FilterValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(raw: &str) -> Self {
        FilterValue::from_raw(raw)
    }
}

impl From<String> for FilterValue {
    fn from(raw: String) -> Self {
        FilterValue::from_raw(&raw)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::from_list(&items)
    }
}

impl ToSql for FilterValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FilterValue::Absent => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            FilterValue::Text(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            FilterValue::Int(n) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*n))),
            // Sequences are flattened to one bound value per entry before
            // binding; a Many here means a caller bypassed the accumulator.
            FilterValue::Many(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "cannot bind a value list to a single placeholder".into(),
            )),
        }
    }
}
