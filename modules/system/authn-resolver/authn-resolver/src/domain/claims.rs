//! Flattened `(type, value)` claim list.

use serde_json::{Map, Value};

/// One asserted claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub typ: String,
    pub value: String,
}

/// Claims extracted from a carrier, in document order.
///
/// Array-valued claims contribute one entry per element; scalars contribute
/// one string-coerced entry. `null` values are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    #[must_use]
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut claims = Vec::new();
        for (typ, value) in object {
            match value {
                Value::Array(items) => {
                    claims.extend(items.iter().filter_map(coerce).map(|value| Claim {
                        typ: typ.clone(),
                        value,
                    }));
                }
                other => {
                    if let Some(value) = coerce(other) {
                        claims.push(Claim {
                            typ: typ.clone(),
                            value,
                        });
                    }
                }
            }
        }
        Self { claims }
    }

    pub fn push(&mut self, typ: impl Into<String>, value: impl Into<String>) {
        self.claims.push(Claim {
            typ: typ.into(),
            value: value.into(),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// First non-empty value, trying `types` in preference order.
    #[must_use]
    pub fn first_value(&self, types: &[&str]) -> Option<&str> {
        self.first_matching(types, |a, b| a == b)
    }

    /// Like [`ClaimSet::first_value`] with ASCII case-insensitive type names.
    #[must_use]
    pub fn first_value_ignore_case(&self, types: &[&str]) -> Option<&str> {
        self.first_matching(types, str::eq_ignore_ascii_case)
    }

    /// All non-empty values whose type is one of `types`.
    pub fn values<'a>(&'a self, types: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(|c| types.contains(&c.typ.as_str()) && !c.value.is_empty())
            .map(|c| c.value.as_str())
    }

    fn first_matching(&self, types: &[&str], eq: impl Fn(&str, &str) -> bool) -> Option<&str> {
        types.iter().find_map(|typ| {
            self.claims
                .iter()
                .find(|c| eq(&c.typ, typ) && !c.value.trim().is_empty())
                .map(|c| c.value.as_str())
        })
    }
}

fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
