// LaTeX front end
//
// `repair` cleans OCR output, `parse` turns the cleaned text into a
// MathNode tree. The two are independent: callers holding clean LaTeX can
// parse directly.

mod lexer;
mod matrix;
mod parser;
mod repair;
pub(crate) mod symbols;

pub use parser::{LatexParser, parse};
pub use repair::{ConfigError, RepairConfig, Repairer, repair};
