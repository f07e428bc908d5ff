use std::collections::BTreeMap;
use tracing::debug;

use crate::error::Result;
use crate::params::{RawParam, RequestParams};
use crate::session::SessionStore;
use crate::value::FilterValue;

/// Per-field registration options.
#[derive(Debug, Clone)]
pub struct FieldOptions {
    template: Option<String>,
    default: Option<FilterValue>,
    sticky: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        FieldOptions::new()
    }
}

impl FieldOptions {
    pub fn new() -> Self {
        FieldOptions {
            template: None,
            default: None,
            sticky: true,
        }
    }

    /// Custom SQL fragment with a single `?` placeholder for the resolved
    /// value (e.g. `"created_at >= ?"`). A template without a placeholder is
    /// appended as-is, as an always-on fragment for this field. The template
    /// is trusted verbatim, so never build one from request input.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Value to fall back to when neither the request nor the session has
    /// one.
    pub fn default_to(mut self, value: impl Into<FilterValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// When false, the resolved value is not written back to the session.
    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }
}

/// The assembled WHERE fragment and its bound values, shaped for a
/// parameterized query call.
#[derive(Debug, Clone)]
pub struct Conditions {
    pub clause: String,
    pub values: Vec<FilterValue>,
}

impl Conditions {
    /// Bound values as rusqlite parameters, in placeholder order.
    pub fn params(&self) -> Vec<&dyn rusqlite::types::ToSql> {
        self.values
            .iter()
            .map(|v| v as &dyn rusqlite::types::ToSql)
            .collect()
    }
}

/// Request-scoped accumulator of filter conditions for one list view.
///
/// Created per request, fed one `register` call per filterable field, then
/// consumed once via [`conditions`](FilterAccumulator::conditions). Resolved
/// values stick in the session keyed by field and request path, so distinct
/// list views keep independent filter state across navigation.
pub struct FilterAccumulator<'a> {
    params: &'a RequestParams,
    session: &'a mut dyn SessionStore,
    constraints: String,
    fragments: Vec<String>,
    values: Vec<FilterValue>,
    resolved: BTreeMap<String, FilterValue>,
}

impl<'a> FilterAccumulator<'a> {
    pub fn new(params: &'a RequestParams, session: &'a mut dyn SessionStore) -> Self {
        Self::with_constraints(params, session, "")
    }

    /// `constraints` is an always-applied SQL fragment ANDed into the final
    /// clause (e.g. a tenant guard). Trusted verbatim, like templates.
    pub fn with_constraints(
        params: &'a RequestParams,
        session: &'a mut dyn SessionStore,
        constraints: impl Into<String>,
    ) -> Self {
        FilterAccumulator {
            params,
            session,
            constraints: constraints.into(),
            fragments: Vec::new(),
            values: Vec::new(),
            resolved: BTreeMap::new(),
        }
    }

    /// Resolve a value for `field` and append its condition fragment.
    ///
    /// Precedence: an incoming request parameter wins outright, and a blank
    /// one clears the field, overriding any remembered value. Only when the
    /// request does not name the field at all does the path-scoped session
    /// value apply, and only then the configured default.
    pub fn register(&mut self, field: &str, opts: FieldOptions) -> Result<()> {
        let value = self.resolve(field, &opts)?;

        if opts.sticky {
            if value.is_absent() {
                self.session.remove(self.params.path(), field)?;
            } else {
                self.session.set(self.params.path(), field, &value)?;
            }
        }

        debug!("Resolved filter {field} = {value:?}");

        match &opts.template {
            Some(template) => match template.find('?') {
                None => self.fragments.push(template.clone()),
                Some(idx) if value.is_present() => {
                    let fragment = self.expand_template(template, idx, &value);
                    self.fragments.push(fragment);
                }
                Some(_) => {} // placeholder template with nothing to bind
            },
            None if value.is_present() => {
                let fragment = match &value {
                    FilterValue::Many(_) => {
                        format!("{field} IN ({})", self.bind(&value))
                    }
                    _ => format!("{field} = {}", self.bind(&value)),
                };
                self.fragments.push(fragment);
            }
            None => {}
        }

        self.resolved.insert(field.to_string(), value);
        Ok(())
    }

    /// Explicit keyed lookup of a resolved value.
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.resolved.get(field)
    }

    /// True iff no fragments were accumulated. Constraints don't count.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Assemble the final clause. Consumes the accumulator: it is queried
    /// exactly once per request.
    pub fn conditions(self) -> Conditions {
        let constraints = self.constraints.trim();
        let clause = match (self.fragments.is_empty(), constraints.is_empty()) {
            (true, true) => "1=1".to_string(),
            (true, false) => format!("({constraints})"),
            (false, true) => format!("({})", self.fragments.join(" AND ")),
            (false, false) => format!(
                "(({}) AND ({constraints}))",
                self.fragments.join(" AND ")
            ),
        };

        Conditions {
            clause,
            values: self.values,
        }
    }

    fn resolve(&mut self, field: &str, opts: &FieldOptions) -> Result<FilterValue> {
        if let Some(raw) = self.params.raw(field) {
            // Present in the request: blank input deliberately clears.
            return Ok(match raw {
                RawParam::Single(s) => FilterValue::from_raw(s),
                RawParam::Many(items) => FilterValue::from_list(items),
            });
        }

        if let Some(stored) = self.session.get(self.params.path(), field)? {
            return Ok(stored);
        }

        Ok(opts.default.clone().unwrap_or(FilterValue::Absent))
    }

    /// Push bound value(s) and return the numbered placeholder text. A
    /// sequence flattens to one bound value per entry.
    fn bind(&mut self, value: &FilterValue) -> String {
        match value {
            FilterValue::Many(items) => {
                let placeholders: Vec<String> = items
                    .iter()
                    .map(|item| {
                        self.values.push(FilterValue::Text(item.clone()));
                        format!("?{}", self.values.len())
                    })
                    .collect();
                placeholders.join(", ")
            }
            other => {
                self.values.push(other.clone());
                format!("?{}", self.values.len())
            }
        }
    }

    /// Replace the template's single `?` (at byte `idx`) with numbered
    /// placeholder(s). Lets `tag IN (?)` work naturally for sequence values.
    fn expand_template(&mut self, template: &str, idx: usize, value: &FilterValue) -> String {
        let placeholders = self.bind(value);
        format!(
            "{}{}{}",
            &template[..idx],
            placeholders,
            &template[idx + 1..]
        )
    }
}
