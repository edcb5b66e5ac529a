//! Ordered parameter list for one mothur command.

use crate::command::value::{EncodeError, ParamValue};

/// One parameter as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Bare value, e.g. the `summary.seqs` in `help(summary.seqs)`.
    Positional(ParamValue),
    /// `key=value`.
    Keyword { key: String, value: ParamValue },
}

/// Parameters in the order the caller supplied them.
///
/// Order has no meaning to mothur but rendering must be deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<Param>,
}

impl Params {
    /// Start with no parameters.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a keyword parameter. Re-adding a key replaces its value in place.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a positional parameter.
    pub fn positional(mut self, value: impl Into<ParamValue>) -> Self {
        self.entries.push(Param::Positional(value.into()));
        self
    }

    /// Insert a keyword parameter, keeping the original position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        for entry in &mut self.entries {
            if let Param::Keyword { key: existing, value: slot } = entry {
                if *existing == key {
                    *slot = value;
                    return;
                }
            }
        }
        self.entries.push(Param::Keyword { key, value });
    }

    /// Whether a keyword parameter with this key was supplied.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, Param::Keyword { key: k, .. } if k == key))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render as the inside of mothur's parentheses.
    ///
    /// Positional values come first, then `key=value` pairs, separated by `", "`.
    pub fn render(&self) -> Result<String, EncodeError> {
        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        for entry in &self.entries {
            match entry {
                Param::Positional(value) => {
                    let name = format!("#{}", positional.len() + 1);
                    positional.push(value.encode_as(&name)?);
                }
                Param::Keyword { key, value } => {
                    keywords.push(format!("{}={}", key, value.encode_as(key)?));
                }
            }
        }
        positional.extend(keywords);
        Ok(positional.join(", "))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}
