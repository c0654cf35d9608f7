//! Minimal XML helpers shared by the serializers.

pub mod builder;
pub mod escape;

pub use builder::XmlBuilder;
pub use escape::{escape_xml, push_escaped, resolve_reference, unescape_references, unescape_xml};
