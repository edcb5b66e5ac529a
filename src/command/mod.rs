//! Command naming and parameter encoding.
//!
//! ```text
//! segments → CommandPath → CommandLine(name, Params) → "name(k=v, ...)"
//! ```

mod line;
mod params;
mod path;
mod value;

pub use line::CommandLine;
pub use params::{Param, Params};
pub use path::CommandPath;
pub use value::{
    EncodeError, ParamValue, CURRENT_KEYWORD, FALSE_TOKEN, LIST_SEPARATOR, TRUE_TOKEN,
};
