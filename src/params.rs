use std::collections::BTreeMap;

/// A raw request parameter before coercion: a single string or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum RawParam {
    Single(String),
    Many(Vec<String>),
}

/// The narrow view of "current request parameters" the accumulator needs:
/// the request path plus the `filter_by` parameter group. Hosts build one
/// per request from their framework's query/form data.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    path: String,
    filter_by: BTreeMap<String, RawParam>,
}

impl RequestParams {
    pub fn new(path: impl Into<String>) -> Self {
        RequestParams {
            path: path.into(),
            filter_by: BTreeMap::new(),
        }
    }

    /// Build from URL-decoded query pairs, picking out the `filter_by` group:
    /// `filter_by[field]=v` for single values, `filter_by[field][]=v`
    /// (repeated) for sequences. Keys outside the group are ignored.
    pub fn from_pairs<'a, I>(path: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = RequestParams::new(path);
        for (key, value) in pairs {
            let Some(rest) = key.strip_prefix("filter_by[") else {
                continue;
            };
            if let Some(field) = rest.strip_suffix("][]") {
                if field.contains(['[', ']']) {
                    continue;
                }
                let entry = params
                    .filter_by
                    .entry(field.to_string())
                    .or_insert_with(|| RawParam::Many(Vec::new()));
                match entry {
                    RawParam::Many(items) => items.push(value.to_string()),
                    // A single value already claimed the field; the sequence
                    // form wins and absorbs it.
                    RawParam::Single(prev) => {
                        let prev = std::mem::take(prev);
                        *entry = RawParam::Many(vec![prev, value.to_string()]);
                    }
                }
            } else if let Some(field) = rest.strip_suffix(']') {
                // Nested or mangled keys like `filter_by[a][b]` are not part
                // of the group; a field name never contains brackets.
                if !field.contains(['[', ']']) {
                    params.set(field, value);
                }
            }
        }
        params
    }

    /// Set a single raw value (last write wins, like repeated query keys).
    pub fn set(&mut self, field: impl Into<String>, raw: impl Into<String>) {
        self.filter_by
            .insert(field.into(), RawParam::Single(raw.into()));
    }

    /// Set a raw sequence value.
    pub fn set_many(&mut self, field: impl Into<String>, values: Vec<String>) {
        self.filter_by.insert(field.into(), RawParam::Many(values));
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn raw(&self, field: &str) -> Option<&RawParam> {
        self.filter_by.get(field)
    }

    /// Whether the request named this field at all. A present-but-blank
    /// parameter is how a request clears a sticky filter, so presence is
    /// distinct from having a usable value.
    pub fn contains(&self, field: &str) -> bool {
        self.filter_by.contains_key(field)
    }
}
