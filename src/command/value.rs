//! Parameter values and their mothur text encoding.
//!
//! mothur's parameter grammar is flat text: booleans are `T`/`F`, lists are
//! hyphen separated, and the literal `current` asks mothur to reuse the last
//! file of the parameter's type.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Separator between list elements (`groups=A-B-C`).
pub const LIST_SEPARATOR: char = '-';
/// mothur's truthy token.
pub const TRUE_TOKEN: &str = "T";
/// mothur's falsy token.
pub const FALSE_TOKEN: &str = "F";
/// mothur's "reuse the current file" keyword.
pub const CURRENT_KEYWORD: &str = "current";
/// Ends a statement in mothur's batch mode. Never allowed inside a value.
const STATEMENT_END: char = ';';

/// A value cannot be expressed in mothur's parameter grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported parameter type for '{param}': {shape} cannot be rendered for mothur")]
pub struct EncodeError {
    /// Parameter key (or `#n` for the n-th positional value).
    pub param: String,
    /// Human readable name of the rejected shape.
    pub shape: &'static str,
}

/// A native value passed as a mothur command parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawValue")]
pub enum ParamValue {
    /// Free text, passed through verbatim. A `;` would end the statement
    /// early, so text containing one is rejected by [`ParamValue::encode`].
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Flat list; elements must themselves be scalars.
    List(Vec<ParamValue>),
    /// The `current` sentinel. Resolved by mothur, not by the codec.
    Current,
    /// Key/value mapping. Accepted so that loosely typed input can be
    /// represented, but always rejected by [`ParamValue::encode`].
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// The `current` sentinel.
    pub fn current() -> Self {
        ParamValue::Current
    }

    /// Encode this value as mothur parameter text.
    pub fn encode(&self) -> Result<String, EncodeError> {
        self.encode_as("value")
    }

    /// Encode, naming `param` in the error if the value is rejected.
    pub fn encode_as(&self, param: &str) -> Result<String, EncodeError> {
        match self {
            ParamValue::List(items) => items
                .iter()
                .map(|item| match item {
                    ParamValue::List(_) => Err(unsupported(param, "nested list")),
                    scalar => scalar.encode_scalar(param),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|parts| parts.join(&LIST_SEPARATOR.to_string())),
            scalar => scalar.encode_scalar(param),
        }
    }

    fn encode_scalar(&self, param: &str) -> Result<String, EncodeError> {
        match self {
            ParamValue::Text(text) if text.contains(STATEMENT_END) => {
                Err(unsupported(param, "statement separator in value"))
            }
            ParamValue::Text(text) => Ok(text.clone()),
            ParamValue::Int(value) => Ok(value.to_string()),
            ParamValue::Float(value) => Ok(format_float(*value)),
            ParamValue::Bool(true) => Ok(TRUE_TOKEN.to_string()),
            ParamValue::Bool(false) => Ok(FALSE_TOKEN.to_string()),
            ParamValue::Current => Ok(CURRENT_KEYWORD.to_string()),
            ParamValue::Map(_) => Err(unsupported(param, "mapping")),
            ParamValue::List(_) => Err(unsupported(param, "nested list")),
        }
    }

    /// Decode a single parameter token.
    ///
    /// A typed value is only produced when encoding it again yields exactly
    /// `text`; anything else stays `Text`. `"1.10"` therefore remains text
    /// while `"1.5"` becomes a float.
    pub fn parse(text: &str) -> Self {
        let candidate = match text {
            TRUE_TOKEN => ParamValue::Bool(true),
            FALSE_TOKEN => ParamValue::Bool(false),
            CURRENT_KEYWORD => ParamValue::Current,
            _ => {
                if let Ok(value) = text.parse::<i64>() {
                    ParamValue::Int(value)
                } else if text.chars().any(|c| c.is_ascii_digit()) {
                    match text.parse::<f64>() {
                        Ok(value) => ParamValue::Float(value),
                        Err(_) => return ParamValue::Text(text.to_string()),
                    }
                } else {
                    return ParamValue::Text(text.to_string());
                }
            }
        };
        match candidate.encode() {
            Ok(encoded) if encoded == text => candidate,
            _ => ParamValue::Text(text.to_string()),
        }
    }

    /// Decode a hyphen separated list, each element via [`ParamValue::parse`].
    pub fn parse_list(text: &str) -> Self {
        ParamValue::List(text.split(LIST_SEPARATOR).map(ParamValue::parse).collect())
    }
}

fn unsupported(param: &str, shape: &'static str) -> EncodeError {
    EncodeError {
        param: param.to_string(),
        shape,
    }
}

/// Whole floats keep a `.0` so they read back as floats. `{:.1}` never
/// switches to exponent notation, so this holds at any magnitude.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Untagged wire shape used when parameters come from TOML or JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<RawValue>),
    Map(BTreeMap<String, RawValue>),
}

impl From<RawValue> for ParamValue {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Bool(value) => ParamValue::Bool(value),
            RawValue::Int(value) => ParamValue::Int(value),
            RawValue::Float(value) => ParamValue::Float(value),
            RawValue::Text(text) if text == CURRENT_KEYWORD => ParamValue::Current,
            RawValue::Text(text) => ParamValue::Text(text),
            RawValue::List(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            RawValue::Map(entries) => ParamValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    match i64::try_from(value) {
                        Ok(value) => ParamValue::Int(value),
                        Err(_) => ParamValue::Text(value.to_string()),
                    }
                }
            }
        )*
    };
}

wide_int_param!(u64, usize);

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue> + Clone> From<&[T]> for ParamValue {
    fn from(items: &[T]) -> Self {
        ParamValue::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>, const N: usize> From<[T; N]> for ParamValue {
    fn from(items: [T; N]) -> Self {
        ParamValue::List(items.into_iter().map(Into::into).collect())
    }
}
