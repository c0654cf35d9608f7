// OMML (Office Math Markup Language) Writer
//
// Serializes the formula AST as Office Math Markup, the format Word stores
// equations in and accepts on the clipboard.
//
// Reference: https://devblogs.microsoft.com/math-in-office/officemath/

mod writer;

pub use writer::{OMML_NS, OmmlWriter, to_omml};
