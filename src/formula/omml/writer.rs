// OMML serializer
//
// Emits an `m:oMathPara` document in the Office math namespace. Runs of
// multi-letter identifiers and literal text are marked upright so Word does
// not italicize function names.

use crate::common::xml::XmlBuilder;
use crate::formula::ast::{AccentType, LargeOperator, MathNode, MatrixFence, Symbol, SymbolKind};
use crate::formula::error::{ConvertError, Result};

pub const OMML_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

/// Serialize a formula tree as an OMML document.
///
/// Fails with [`ConvertError::UnsupportedSymbol`] naming the first
/// unsupported node; no partial document is produced.
pub fn to_omml(node: &MathNode) -> Result<String> {
    OmmlWriter::default().write(node)
}

#[derive(Default)]
pub struct OmmlWriter {
    xml: XmlBuilder,
}

impl OmmlWriter {
    pub fn write(mut self, node: &MathNode) -> Result<String> {
        if let Some(name) = node.find_unsupported() {
            return Err(ConvertError::UnsupportedSymbol(name.to_string()));
        }
        self.xml = XmlBuilder::with_capacity(128 + node.node_count() * 48);
        self.xml.start_with_attrs("m:oMathPara", &[("xmlns:m", OMML_NS)]);
        self.xml.start("m:oMath");
        self.write_node(node);
        self.xml.end("m:oMath");
        self.xml.end("m:oMathPara");
        Ok(self.xml.finish())
    }

    fn write_node(&mut self, node: &MathNode) {
        match node {
            MathNode::Symbol(symbol) => self.write_symbol(symbol),
            MathNode::Greek(letter) => {
                let mut buf = [0u8; 4];
                self.write_run(letter.glyph.encode_utf8(&mut buf), false);
            },
            MathNode::Superscript { base, exponent } => {
                self.xml.start("m:sSup");
                self.write_arg("m:e", base);
                self.write_arg("m:sup", exponent);
                self.xml.end("m:sSup");
            },
            MathNode::Subscript { base, subscript } => {
                self.xml.start("m:sSub");
                self.write_arg("m:e", base);
                self.write_arg("m:sub", subscript);
                self.xml.end("m:sSub");
            },
            MathNode::SubSup {
                base,
                subscript,
                superscript,
            } => {
                self.xml.start("m:sSubSup");
                self.write_arg("m:e", base);
                self.write_arg("m:sub", subscript);
                self.write_arg("m:sup", superscript);
                self.xml.end("m:sSubSup");
            },
            MathNode::Frac {
                numerator,
                denominator,
            } => {
                self.xml.start("m:f");
                self.write_arg("m:num", numerator);
                self.write_arg("m:den", denominator);
                self.xml.end("m:f");
            },
            MathNode::Sqrt(radicand) => {
                self.xml.start("m:rad");
                self.xml.start("m:radPr");
                self.xml.empty("m:degHide", &[("m:val", "1")]);
                self.xml.end("m:radPr");
                self.xml.empty("m:deg", &[]);
                self.write_arg("m:e", radicand);
                self.xml.end("m:rad");
            },
            MathNode::Root { index, radicand } => {
                self.xml.start("m:rad");
                self.write_arg("m:deg", index);
                self.write_arg("m:e", radicand);
                self.xml.end("m:rad");
            },
            MathNode::LargeOp {
                operator,
                lower,
                upper,
                body,
            } => {
                if operator.is_limit() {
                    self.write_limit(*operator, lower.as_deref(), upper.as_deref(), body.as_deref());
                } else {
                    self.write_nary(*operator, lower.as_deref(), upper.as_deref(), body.as_deref());
                }
            },
            MathNode::Accent { accent, base } => self.write_accent(*accent, base),
            MathNode::Matrix { rows, fence } => self.write_matrix(rows, *fence),
            MathNode::Group(children) => {
                for child in children {
                    self.write_node(child);
                }
            },
            // Rejected up front by `write`
            MathNode::Unsupported(_) => {},
        }
    }

    fn write_arg(&mut self, tag: &str, node: &MathNode) {
        self.xml.start(tag);
        self.write_node(node);
        self.xml.end(tag);
    }

    fn write_symbol(&mut self, symbol: &Symbol) {
        let upright = match symbol.kind {
            SymbolKind::Text => true,
            SymbolKind::Identifier => symbol.text.chars().nth(1).is_some(),
            SymbolKind::Number | SymbolKind::Operator => false,
        };
        self.write_run(&symbol.text, upright);
    }

    fn write_run(&mut self, text: &str, upright: bool) {
        self.xml.start("m:r");
        if upright {
            self.xml.start("m:rPr");
            self.xml.empty("m:sty", &[("m:val", "p")]);
            self.xml.end("m:rPr");
        }
        if text.starts_with(' ') || text.ends_with(' ') {
            self.xml.start_with_attrs("m:t", &[("xml:space", "preserve")]);
        } else {
            self.xml.start("m:t");
        }
        self.xml.text(text);
        self.xml.end("m:t");
        self.xml.end("m:r");
    }

    fn write_nary(
        &mut self,
        operator: LargeOperator,
        lower: Option<&MathNode>,
        upper: Option<&MathNode>,
        body: Option<&MathNode>,
    ) {
        let limit_location = if operator.is_integral() {
            "subSup"
        } else {
            "undOvr"
        };
        self.xml.start("m:nary");
        self.xml.start("m:naryPr");
        self.xml.empty("m:chr", &[("m:val", operator.glyph())]);
        self.xml.empty("m:limLoc", &[("m:val", limit_location)]);
        if lower.is_none() {
            self.xml.empty("m:subHide", &[("m:val", "1")]);
        }
        if upper.is_none() {
            self.xml.empty("m:supHide", &[("m:val", "1")]);
        }
        self.xml.end("m:naryPr");
        self.write_optional("m:sub", lower);
        self.write_optional("m:sup", upper);
        self.write_optional("m:e", body);
        self.xml.end("m:nary");
    }

    fn write_limit(
        &mut self,
        operator: LargeOperator,
        lower: Option<&MathNode>,
        upper: Option<&MathNode>,
        body: Option<&MathNode>,
    ) {
        self.xml.start("m:func");
        self.xml.start("m:fName");
        if upper.is_some() {
            self.xml.start("m:limUpp");
            self.xml.start("m:e");
        }
        if lower.is_some() {
            self.xml.start("m:limLow");
            self.xml.start("m:e");
        }
        self.write_run(operator.glyph(), true);
        if let Some(lower) = lower {
            self.xml.end("m:e");
            self.write_arg("m:lim", lower);
            self.xml.end("m:limLow");
        }
        if let Some(upper) = upper {
            self.xml.end("m:e");
            self.write_arg("m:lim", upper);
            self.xml.end("m:limUpp");
        }
        self.xml.end("m:fName");
        self.write_optional("m:e", body);
        self.xml.end("m:func");
    }

    fn write_optional(&mut self, tag: &str, node: Option<&MathNode>) {
        match node {
            Some(node) => self.write_arg(tag, node),
            None => self.xml.empty(tag, &[]),
        }
    }

    fn write_accent(&mut self, accent: AccentType, base: &MathNode) {
        let mut buf = [0u8; 4];
        let chr: &str = accent.combining_char().encode_utf8(&mut buf);
        self.xml.start("m:acc");
        self.xml.start("m:accPr");
        self.xml.empty("m:chr", &[("m:val", chr)]);
        self.xml.end("m:accPr");
        self.write_arg("m:e", base);
        self.xml.end("m:acc");
    }

    fn write_matrix(&mut self, rows: &[Vec<MathNode>], fence: MatrixFence) {
        let fenced = fence != MatrixFence::None;
        if fenced {
            self.xml.start("m:d");
            self.xml.start("m:dPr");
            self.xml
                .empty("m:begChr", &[("m:val", fence.open().unwrap_or_default())]);
            self.xml
                .empty("m:endChr", &[("m:val", fence.close().unwrap_or_default())]);
            self.xml.end("m:dPr");
            self.xml.start("m:e");
        }

        let columns = rows.first().map(Vec::len).unwrap_or(0).to_string();
        self.xml.start("m:m");
        self.xml.start("m:mPr");
        self.xml.start("m:mcs");
        self.xml.start("m:mc");
        self.xml.start("m:mcPr");
        self.xml.empty("m:count", &[("m:val", columns.as_str())]);
        self.xml.empty("m:mcJc", &[("m:val", "center")]);
        self.xml.end("m:mcPr");
        self.xml.end("m:mc");
        self.xml.end("m:mcs");
        self.xml.end("m:mPr");
        for row in rows {
            self.xml.start("m:mr");
            for cell in row {
                self.write_arg("m:e", cell);
            }
            self.xml.end("m:mr");
        }
        self.xml.end("m:m");

        if fenced {
            self.xml.end("m:e");
            self.xml.end("m:d");
        }
    }
}
