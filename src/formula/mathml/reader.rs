// MathML reader
//
// Parses MathML into a small element tree with quick-xml, then rebuilds a
// MathNode tree through FormulaBuilder so that scripts, large-operator
// bounds and fenced matrices come out exactly as the LaTeX parser would
// have built them.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::xml::{resolve_reference, unescape_references, unescape_xml};
use crate::formula::ast::{AccentType, FormulaBuilder, LargeOperator, MathNode, Symbol};
use crate::formula::error::{ConvertError, Result};
use crate::formula::latex::symbols;

/// Maximum element nesting depth to prevent stack overflow
const MAX_DEPTH: usize = 128;

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Content>,
}

#[derive(Debug)]
enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape_references(&raw).ok_or_else(|| {
                ConvertError::XmlFormat(format!("invalid reference in attribute value {:?}", raw))
            })?;
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    /// Concatenated character data of the whole subtree.
    fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Content::Text(t) => out.push_str(t),
                Content::Element(e) => e.collect_text(out),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Content::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Content::Text(text.to_string()));
        }
    }

    /// Exactly `N` element children, or a format error naming the element.
    fn operands<const N: usize>(&self) -> Result<[&Element; N]> {
        let operands: Vec<&Element> = self.elements().collect();
        let found = operands.len();
        operands.try_into().map_err(|_| {
            ConvertError::XmlFormat(format!(
                "<{}> expects {} children, found {}",
                self.name, N, found
            ))
        })
    }
}

/// Read a MathML document into a formula tree.
pub fn read_mathml(mathml: &str) -> Result<MathNode> {
    let root = parse_document(mathml)?;
    Ok(convert_element(&root)?.unwrap_or_else(MathNode::empty))
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::with_capacity(16);
    let mut root: Option<Element> = None;

    loop {
        let from = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            ConvertError::XmlFormat(format!(
                "XML parse error at position {}: {}",
                reader.error_position(),
                e
            ))
        })?;
        let to = reader.buffer_position() as usize;
        let raw = xml.get(from..to).unwrap_or_default();

        match event {
            Event::Start(ref e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(ConvertError::XmlFormat(format!(
                        "maximum nesting depth exceeded: {}",
                        MAX_DEPTH
                    )));
                }
                stack.push(Element::from_start(e)?);
            },
            Event::Empty(ref e) => {
                let element = Element::from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ConvertError::XmlFormat("unmatched end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::Text(_) => push_text(&mut stack, &unescape_xml(raw))?,
            Event::GeneralRef(_) => {
                let name = raw.trim_start_matches('&').trim_end_matches(';');
                let resolved = resolve_reference(name).ok_or_else(|| {
                    ConvertError::XmlFormat(format!("unknown entity reference &{};", name))
                })?;
                push_text(&mut stack, &resolved)?;
            },
            Event::CData(_) => {
                let inner = raw
                    .strip_prefix("<![CDATA[")
                    .and_then(|s| s.strip_suffix("]]>"))
                    .unwrap_or_default();
                push_text(&mut stack, inner)?;
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !stack.is_empty() {
        return Err(ConvertError::XmlFormat(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| ConvertError::XmlFormat("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Content::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ConvertError::XmlFormat(
                "document has more than one root element".to_string(),
            ));
        },
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {},
        None => {
            return Err(ConvertError::XmlFormat(
                "text outside the root element".to_string(),
            ));
        },
    }
    Ok(())
}

fn convert_element(el: &Element) -> Result<Option<MathNode>> {
    let node = match el.name.as_str() {
        "math" | "mrow" | "mstyle" | "mpadded" | "menclose" | "mtd" => convert_row(el)?,
        "semantics" | "maction" => match el.elements().next() {
            Some(first) => return convert_element(first),
            None => return Ok(None),
        },
        "annotation" | "annotation-xml" | "mspace" | "mphantom" | "maligngroup"
        | "malignmark" | "none" => return Ok(None),
        "mi" => identifier(el),
        "mn" => MathNode::Symbol(Symbol::number(el.text().trim())),
        "mo" => {
            let text = el.text();
            let text = text.trim();
            match LargeOperator::from_glyph(text) {
                Some(operator) => FormulaBuilder::large_op(operator, None, None, None),
                None => MathNode::Symbol(Symbol::operator(text)),
            }
        },
        "mtext" | "ms" => {
            let text = el.text();
            if text.is_empty() {
                return Ok(None);
            }
            MathNode::Symbol(Symbol::text(text))
        },
        "mfrac" => {
            let [numerator, denominator] = el.operands()?;
            FormulaBuilder::frac(convert_operand(numerator)?, convert_operand(denominator)?)
        },
        "msqrt" => FormulaBuilder::sqrt(convert_row(el)?),
        "mroot" => {
            let [radicand, index] = el.operands()?;
            FormulaBuilder::root(convert_operand(index)?, convert_operand(radicand)?)
        },
        "msup" => {
            let [base, sup] = el.operands()?;
            FormulaBuilder::attach_upper(convert_operand(base)?, convert_operand(sup)?)
        },
        "msub" => {
            let [base, sub] = el.operands()?;
            FormulaBuilder::attach_lower(convert_operand(base)?, convert_operand(sub)?)
        },
        "msubsup" => {
            let [base, sub, sup] = el.operands()?;
            let scripted =
                FormulaBuilder::attach_lower(convert_operand(base)?, convert_operand(sub)?);
            FormulaBuilder::attach_upper(scripted, convert_operand(sup)?)
        },
        "munder" => {
            let [base, under] = el.operands()?;
            match as_large_op(convert_operand(base)?) {
                Some(op) => FormulaBuilder::attach_lower(op, convert_operand(under)?),
                None => return Err(ConvertError::UnsupportedSymbol("munder".to_string())),
            }
        },
        "mover" => {
            let [base, over] = el.operands()?;
            let base = convert_operand(base)?;
            let explicit_accent = el.attribute("accent") == Some("true");
            if explicit_accent && let Some(accent) = accent_of(el, over) {
                FormulaBuilder::accent(accent, base)
            } else if is_bare_large_op(&base) {
                FormulaBuilder::attach_upper(base, convert_operand(over)?)
            } else if let Some(accent) = accent_of(el, over) {
                FormulaBuilder::accent(accent, base)
            } else {
                match as_large_op(base) {
                    Some(op) => FormulaBuilder::attach_upper(op, convert_operand(over)?),
                    None => return Err(ConvertError::UnsupportedSymbol("mover".to_string())),
                }
            }
        },
        "munderover" => {
            let [base, under, over] = el.operands()?;
            match as_large_op(convert_operand(base)?) {
                Some(op) => {
                    let bounded = FormulaBuilder::attach_lower(op, convert_operand(under)?);
                    FormulaBuilder::attach_upper(bounded, convert_operand(over)?)
                },
                None => return Err(ConvertError::UnsupportedSymbol("munderover".to_string())),
            }
        },
        "mtable" => convert_table(el)?,
        "mfenced" => convert_fenced(el)?,
        "merror" => return Err(ConvertError::UnsupportedSymbol(el.text().trim().to_string())),
        other => return Err(ConvertError::UnsupportedSymbol(other.to_string())),
    };
    Ok(Some(node))
}

fn convert_operand(el: &Element) -> Result<MathNode> {
    Ok(convert_element(el)?.unwrap_or_else(MathNode::empty))
}

/// Children of a row-like element, with stray text kept as text.
fn convert_row(el: &Element) -> Result<MathNode> {
    let mut nodes = Vec::with_capacity(el.children.len());
    for child in &el.children {
        match child {
            Content::Element(e) => {
                if let Some(node) = convert_element(e)? {
                    nodes.push(node);
                }
            },
            Content::Text(t) if t.trim().is_empty() => {},
            Content::Text(t) => nodes.push(MathNode::Symbol(Symbol::text(t.trim()))),
        }
    }
    Ok(FormulaBuilder::row(nodes))
}

fn identifier(el: &Element) -> MathNode {
    let text = el.text();
    let text = text.trim();
    let variant: Option<fn(char) -> char> = match el.attribute("mathvariant") {
        Some("double-struck") => Some(symbols::double_struck_letter),
        Some("script") => Some(symbols::script_letter),
        _ => None,
    };
    if let Some(map) = variant {
        let letters = text
            .chars()
            .map(|c| MathNode::Symbol(Symbol::identifier(map(c))))
            .collect();
        return FormulaBuilder::group(letters);
    }

    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && let Some(letter) = symbols::greek_by_glyph(c)
    {
        return MathNode::Greek(letter);
    }
    MathNode::Symbol(Symbol::identifier(text))
}

#[inline]
fn is_bare_large_op(node: &MathNode) -> bool {
    matches!(node, MathNode::LargeOp { body: None, .. })
}

/// Treat `<mi>lim</mi>` and friends as large operators when used as a base.
fn as_large_op(node: MathNode) -> Option<MathNode> {
    match node {
        MathNode::LargeOp { body: None, .. } => Some(node),
        MathNode::Symbol(ref symbol) => LargeOperator::from_glyph(&symbol.text)
            .map(|operator| FormulaBuilder::large_op(operator, None, None, None)),
        _ => None,
    }
}

fn accent_of(mover: &Element, over: &Element) -> Option<AccentType> {
    let flagged = mover.attribute("accent") == Some("true") || over.name == "mo";
    if !flagged {
        return None;
    }
    let text = over.text();
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => AccentType::from_char(c),
        _ => None,
    }
}

fn convert_table(el: &Element) -> Result<MathNode> {
    let mut rows = Vec::new();
    for row in el.elements() {
        let cells = match row.name.as_str() {
            "mtr" => row.elements().map(convert_operand).collect::<Result<Vec<_>>>()?,
            // First cell of a labeled row is the equation label
            "mlabeledtr" => row
                .elements()
                .skip(1)
                .map(convert_operand)
                .collect::<Result<Vec<_>>>()?,
            _ => vec![convert_operand(row)?],
        };
        rows.push(cells);
    }
    Ok(FormulaBuilder::matrix(rows, Default::default())?)
}

fn convert_fenced(el: &Element) -> Result<MathNode> {
    let open = el.attribute("open").unwrap_or("(");
    let close = el.attribute("close").unwrap_or(")");
    let separator = el
        .attribute("separators")
        .unwrap_or(",")
        .trim()
        .chars()
        .next();

    let mut nodes = Vec::new();
    if !open.is_empty() {
        nodes.push(MathNode::Symbol(Symbol::operator(open)));
    }
    for (i, child) in el.elements().enumerate() {
        if i > 0
            && let Some(sep) = separator
        {
            nodes.push(MathNode::Symbol(Symbol::operator(sep)));
        }
        if let Some(node) = convert_element(child)? {
            nodes.push(node);
        }
    }
    if !close.is_empty() {
        nodes.push(MathNode::Symbol(Symbol::operator(close)));
    }
    Ok(FormulaBuilder::row(nodes))
}
