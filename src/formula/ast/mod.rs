// Abstract Syntax Tree for Mathematical Formulas
//
// This module defines the typed intermediate representation shared by the
// LaTeX parser, the MathML reader and both XML serializers. Adding a
// construct means adding a variant here; every serializer matches
// exhaustively, so the compiler points at each place that needs it.

mod builder;
mod node;
mod types;

pub use builder::FormulaBuilder;
pub use node::MathNode;
pub use types::*;
