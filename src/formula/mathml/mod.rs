// MathML (Presentation Markup)
//
// The writer serializes a formula tree as a `<math>` document; the reader
// turns Presentation MathML from any producer back into a formula tree so
// that it can be re-serialized as OMML.

mod reader;
mod writer;

pub use reader::read_mathml;
pub use writer::{MATHML_NS, MathmlDisplay, MathmlWriter, to_mathml};
