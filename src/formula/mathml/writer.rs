// MathML serializer

use serde::{Deserialize, Serialize};

use crate::common::xml::XmlBuilder;
use crate::formula::ast::{LargeOperator, MathNode, Symbol, SymbolKind};
use crate::formula::error::{ConvertError, Result};

pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Value of the `display` attribute on the `<math>` root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathmlDisplay {
    #[default]
    Inline,
    Block,
}

impl MathmlDisplay {
    pub fn as_str(self) -> &'static str {
        match self {
            MathmlDisplay::Inline => "inline",
            MathmlDisplay::Block => "block",
        }
    }
}

/// Serialize a formula tree as inline MathML.
///
/// Fails with [`ConvertError::UnsupportedSymbol`] naming the first
/// unsupported node; no partial document is produced.
pub fn to_mathml(node: &MathNode) -> Result<String> {
    MathmlWriter::new(MathmlDisplay::Inline).write(node)
}

pub struct MathmlWriter {
    xml: XmlBuilder,
    display: MathmlDisplay,
}

impl MathmlWriter {
    pub fn new(display: MathmlDisplay) -> Self {
        Self {
            xml: XmlBuilder::default(),
            display,
        }
    }

    pub fn write(mut self, node: &MathNode) -> Result<String> {
        if let Some(name) = node.find_unsupported() {
            return Err(ConvertError::UnsupportedSymbol(name.to_string()));
        }
        self.xml = XmlBuilder::with_capacity(64 + node.node_count() * 24);
        self.xml.start_with_attrs(
            "math",
            &[("xmlns", MATHML_NS), ("display", self.display.as_str())],
        );
        self.write_node(node);
        self.xml.end("math");
        Ok(self.xml.finish())
    }

    fn write_node(&mut self, node: &MathNode) {
        match node {
            MathNode::Symbol(symbol) => self.write_symbol(symbol),
            MathNode::Greek(letter) => {
                let mut buf = [0u8; 4];
                self.xml.leaf("mi", letter.glyph.encode_utf8(&mut buf));
            },
            MathNode::Superscript { base, exponent } => {
                self.xml.start("msup");
                self.write_node(base);
                self.write_node(exponent);
                self.xml.end("msup");
            },
            MathNode::Subscript { base, subscript } => {
                self.xml.start("msub");
                self.write_node(base);
                self.write_node(subscript);
                self.xml.end("msub");
            },
            MathNode::SubSup {
                base,
                subscript,
                superscript,
            } => {
                self.xml.start("msubsup");
                self.write_node(base);
                self.write_node(subscript);
                self.write_node(superscript);
                self.xml.end("msubsup");
            },
            MathNode::Frac {
                numerator,
                denominator,
            } => {
                self.xml.start("mfrac");
                self.write_node(numerator);
                self.write_node(denominator);
                self.xml.end("mfrac");
            },
            MathNode::Sqrt(radicand) => {
                self.xml.start("msqrt");
                self.write_node(radicand);
                self.xml.end("msqrt");
            },
            MathNode::Root { index, radicand } => {
                self.xml.start("mroot");
                self.write_node(radicand);
                self.write_node(index);
                self.xml.end("mroot");
            },
            MathNode::LargeOp {
                operator,
                lower,
                upper,
                body,
            } => {
                if let Some(body) = body {
                    self.xml.start("mrow");
                    self.write_large_op(*operator, lower.as_deref(), upper.as_deref());
                    self.write_node(body);
                    self.xml.end("mrow");
                } else {
                    self.write_large_op(*operator, lower.as_deref(), upper.as_deref());
                }
            },
            MathNode::Accent { accent, base } => {
                self.xml.start_with_attrs("mover", &[("accent", "true")]);
                self.write_node(base);
                let mut buf = [0u8; 4];
                self.xml.leaf("mo", accent.combining_char().encode_utf8(&mut buf));
                self.xml.end("mover");
            },
            MathNode::Matrix { rows, fence } => {
                let fenced = fence.open().is_some() || fence.close().is_some();
                if fenced {
                    self.xml.start("mrow");
                }
                if let Some(open) = fence.open() {
                    self.xml.leaf("mo", open);
                }
                self.xml.start("mtable");
                for row in rows {
                    self.xml.start("mtr");
                    for cell in row {
                        self.xml.start("mtd");
                        self.write_node(cell);
                        self.xml.end("mtd");
                    }
                    self.xml.end("mtr");
                }
                self.xml.end("mtable");
                if let Some(close) = fence.close() {
                    self.xml.leaf("mo", close);
                }
                if fenced {
                    self.xml.end("mrow");
                }
            },
            MathNode::Group(children) => {
                self.xml.start("mrow");
                for child in children {
                    self.write_node(child);
                }
                self.xml.end("mrow");
            },
            // Rejected up front by `write`
            MathNode::Unsupported(name) => self.xml.leaf("merror", name),
        }
    }

    fn write_symbol(&mut self, symbol: &Symbol) {
        let tag = match symbol.kind {
            SymbolKind::Identifier => "mi",
            SymbolKind::Number => "mn",
            SymbolKind::Operator => "mo",
            SymbolKind::Text => "mtext",
        };
        self.xml.leaf(tag, &symbol.text);
    }

    fn write_large_op(
        &mut self,
        operator: LargeOperator,
        lower: Option<&MathNode>,
        upper: Option<&MathNode>,
    ) {
        let tag = match (lower, upper) {
            (Some(_), Some(_)) => "munderover",
            (Some(_), None) => "munder",
            (None, Some(_)) => "mover",
            (None, None) => {
                self.xml.leaf("mo", operator.glyph());
                return;
            },
        };
        self.xml.start(tag);
        self.xml.leaf("mo", operator.glyph());
        for bound in [lower, upper].into_iter().flatten() {
            self.write_node(bound);
        }
        self.xml.end(tag);
    }
}
