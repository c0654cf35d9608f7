//! formula-convert - Turn OCR'd LaTeX into equations office applications accept
//!
//! This library takes the noisy LaTeX a formula recognizer produces and
//! converts it into Presentation MathML and Office Math Markup Language
//! (OMML), the format Word stores live equations in.
//!
//! # Features
//!
//! - **Repair**: Cleans OCR artifacts (math wrappers, style switches, redundant
//!   braces, despaced function names) before parsing
//! - **Parser**: Recursive-descent LaTeX parser producing a typed formula tree
//! - **MathML**: Writer and reader for Presentation MathML
//! - **OMML**: Writer for Word equations, reachable from LaTeX or MathML
//! - **Export**: Clipboard payloads and batch `.tex`/`.docx` content with
//!   per-formula failure fallback
//!
//! Conversion is pure and synchronous; every function can be called from
//! any number of threads at once.
//!
//! # Example - LaTeX to Word
//!
//! ```
//! use formula_convert::{latex_to_omml, pretty_print};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let omml = latex_to_omml(r"\[ \sum_{i=1}^{n} i = \frac{n(n+1)}{2} \]")?;
//! assert!(omml.contains("<m:nary>"));
//! println!("{}", pretty_print(&omml)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - MathML to Word
//!
//! ```
//! use formula_convert::mathml_to_omml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let omml = mathml_to_omml("<math><msup><mi>x</mi><mn>2</mn></msup></math>")?;
//! assert!(omml.contains("<m:sSup>"));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Custom repair settings
//!
//! ```
//! use formula_convert::{Converter, RepairConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RepairConfig::from_yaml("despaced_words: [arg]")?;
//! let converter = Converter::new(config);
//! assert_eq!(converter.repair(r"a r g z"), "arg z");
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod export;
pub mod formula;

pub use export::{ClipboardPayload, WrapStyle, clipboard_payload, docx_body, tex_document, wrap};
pub use formula::{
    ConfigError, ConvertError, Converter, MathNode, MathmlDisplay, ParseError, RepairConfig,
    Result, latex_to_mathml, latex_to_omml, mathml_to_omml, parse, pretty_print, read_mathml,
    repair, to_mathml, to_omml,
};
