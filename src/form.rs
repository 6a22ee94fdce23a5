//! Submitted form data and its projection onto a table's columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Field name → submitted values. Only the first value of a field is used.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Form {
    fields: HashMap<String, Vec<String>>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` body or query string.
    pub fn parse(input: &[u8]) -> Self {
        url::form_urlencoded::parse(input).into_owned().collect()
    }

    /// Appends a value to `name`.
    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    /// First value submitted for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values submitted for `name`.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, Vec<String>>> for Form {
    fn from(fields: HashMap<String, Vec<String>>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Form {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (name, value) in iter {
            let name: String = name.into();
            form.append(&name, value);
        }
        form
    }
}

/// Column names and their values, in table column order.
///
/// `keys` and `values` always have the same length.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Projection {
    pub keys: Vec<String>,
    pub values: Vec<String>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Keeps the columns of `columns` that the form supplies with a non-empty value.
///
/// Form fields that are not table columns are ignored, and the result follows
/// the order of `columns`, not the form.
pub fn project<S: AsRef<str>>(form: &Form, columns: &[S]) -> Projection {
    let first_values: HashMap<&str, &str> = form
        .fields
        .iter()
        .filter_map(|(name, values)| Some((name.as_str(), values.first()?.as_str())))
        .collect();

    let mut projection = Projection::default();
    for column in columns {
        let column = column.as_ref();
        match first_values.get(column) {
            Some(value) if !value.is_empty() => {
                projection.keys.push(column.to_string());
                projection.values.push(value.to_string());
            }
            _ => {}
        }
    }
    projection
}
