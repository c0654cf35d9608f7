// XML pretty-printer
//
// Re-indents an XML document without touching its content: every event is
// copied from the source byte-for-byte, only whitespace-only text between
// markup is dropped and replaced by newline + indentation.

use super::error::{ConvertError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

const DEFAULT_INDENT: usize = 2;

/// Reformat `xml` with two-space nested indentation.
///
/// Parsing the output yields the same elements, attributes, text and
/// ordering as parsing the input. Malformed input is an error, never
/// passed through.
pub fn pretty_print(xml: &str) -> Result<String> {
    pretty_print_with_indent(xml, DEFAULT_INDENT)
}

/// Reformat `xml` using `indent` spaces per nesting level.
pub fn pretty_print_with_indent(xml: &str, indent: usize) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::with_capacity(xml.len() + xml.len() / 2);
    let mut pending = String::new();
    let mut open: Vec<usize> = Vec::with_capacity(32);
    let mut roots = 0usize;
    let mut just_opened = false;

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
                check_attributes(e)?;
                if open.is_empty() {
                    roots += 1;
                    check_single_root(roots)?;
                }
                flush_inline(&mut out, &mut pending);
                new_line(&mut out, open.len() * indent);
                out.push_str(raw);
                open.push(from);
                just_opened = true;
            },
            Event::Empty(ref e) => {
                check_attributes(e)?;
                if open.is_empty() {
                    roots += 1;
                    check_single_root(roots)?;
                }
                flush_inline(&mut out, &mut pending);
                new_line(&mut out, open.len() * indent);
                out.push_str(raw);
                just_opened = false;
            },
            Event::End(_) => {
                if open.pop().is_none() {
                    return Err(ConvertError::XmlFormat(format!(
                        "unmatched closing tag at position {}",
                        from
                    )));
                }
                if just_opened {
                    // Leaf element: keep its content exactly, whitespace included
                    out.push_str(&pending);
                    pending.clear();
                } else {
                    flush_inline(&mut out, &mut pending);
                    new_line(&mut out, open.len() * indent);
                }
                out.push_str(raw);
                just_opened = false;
            },
            Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => {
                if open.is_empty() {
                    if !is_xml_whitespace(raw) {
                        return Err(ConvertError::XmlFormat(format!(
                            "content outside of the root element at position {}",
                            from
                        )));
                    }
                    continue;
                }
                pending.push_str(raw);
            },
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {
                flush_inline(&mut out, &mut pending);
                new_line(&mut out, open.len() * indent);
                out.push_str(raw);
                just_opened = false;
            },
        }
    }

    if let Some(position) = open.last() {
        return Err(ConvertError::XmlFormat(format!(
            "unclosed element opened at position {}",
            position
        )));
    }
    if roots == 0 {
        return Err(ConvertError::XmlFormat("no root element".to_string()));
    }

    Ok(out)
}

fn check_attributes(start: &BytesStart) -> Result<()> {
    for attr in start.attributes() {
        attr?;
    }
    Ok(())
}

fn check_single_root(roots: usize) -> Result<()> {
    if roots > 1 {
        return Err(ConvertError::XmlFormat(
            "multiple root elements".to_string(),
        ));
    }
    Ok(())
}

#[inline]
fn is_xml_whitespace(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

fn flush_inline(out: &mut String, pending: &mut String) {
    if !is_xml_whitespace(pending) {
        out.push_str(pending);
    }
    pending.clear();
}

fn new_line(out: &mut String, width: usize) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.extend(std::iter::repeat_n(' ', width));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Minimal DOM used to compare documents modulo whitespace.
    #[derive(Debug, PartialEq)]
    enum Node {
        Element {
            name: String,
            attrs: Vec<(String, String)>,
            children: Vec<Node>,
        },
        Text(String),
    }

    fn parse_dom(xml: &str) -> Node {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Node> = vec![Node::Element {
            name: String::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }];

        fn element(e: &BytesStart) -> Node {
            let mut attrs: Vec<(String, String)> = e
                .attributes()
                .map(|a| {
                    let a = a.unwrap();
                    (
                        String::from_utf8_lossy(a.key.as_ref()).to_string(),
                        String::from_utf8_lossy(&a.value).to_string(),
                    )
                })
                .collect();
            attrs.sort();
            Node::Element {
                name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                attrs,
                children: Vec::new(),
            }
        }

        fn push_child(stack: &mut [Node], node: Node) {
            if let Some(Node::Element { children, .. }) = stack.last_mut() {
                children.push(node);
            }
        }

        fn push_text(stack: &mut [Node], text: &str) {
            if let Some(Node::Element { children, .. }) = stack.last_mut() {
                if let Some(Node::Text(prev)) = children.last_mut() {
                    prev.push_str(text);
                } else {
                    children.push(Node::Text(text.to_string()));
                }
            }
        }

        loop {
            let from = reader.buffer_position() as usize;
            let event = reader.read_event().unwrap();
            let raw = &xml[from..reader.buffer_position() as usize];
            match event {
                Event::Start(ref e) => stack.push(element(e)),
                Event::Empty(ref e) => push_child(&mut stack, element(e)),
                Event::End(_) => {
                    let node = stack.pop().unwrap();
                    push_child(&mut stack, node);
                },
                Event::Text(_) | Event::GeneralRef(_) => push_text(&mut stack, raw),
                Event::Eof => break,
                _ => {},
            }
        }

        fn normalize(node: Node) -> Option<Node> {
            match node {
                Node::Text(t) => {
                    let t = t.trim().to_string();
                    if t.is_empty() { None } else { Some(Node::Text(t)) }
                },
                Node::Element {
                    name,
                    attrs,
                    children,
                } => Some(Node::Element {
                    name,
                    attrs,
                    children: children.into_iter().filter_map(normalize).collect(),
                }),
            }
        }

        normalize(stack.pop().unwrap()).unwrap()
    }

    #[test]
    fn test_indents_nested_elements() {
        let xml = r#"<m:oMathPara xmlns:m="urn:m"><m:oMath><m:r><m:t>x</m:t></m:r></m:oMath></m:oMathPara>"#;
        let pretty = pretty_print(xml).unwrap();
        assert_eq!(
            pretty,
            "<m:oMathPara xmlns:m=\"urn:m\">\n  <m:oMath>\n    <m:r>\n      <m:t>x</m:t>\n    </m:r>\n  </m:oMath>\n</m:oMathPara>"
        );
    }

    #[test]
    fn test_preserves_entities_and_leaf_whitespace() {
        let xml = "<a><b>x &amp; y</b><c> </c><d/></a>";
        let pretty = pretty_print(xml).unwrap();
        assert!(pretty.contains("<b>x &amp; y</b>"));
        assert!(pretty.contains("<c> </c>"));
        assert_eq!(parse_dom(xml), parse_dom(&pretty));
    }

    #[test]
    fn test_reindents_already_pretty_input() {
        let xml = "<a>\n        <b>1</b>\n<c/></a>";
        let pretty = pretty_print(xml).unwrap();
        assert_eq!(pretty, "<a>\n  <b>1</b>\n  <c/>\n</a>");
    }

    #[test]
    fn test_keeps_declaration() {
        let xml = r#"<?xml version="1.0"?><a><b/></a>"#;
        let pretty = pretty_print(xml).unwrap();
        assert!(pretty.starts_with(r#"<?xml version="1.0"?>"#));
        assert!(pretty.ends_with("</a>"));
    }

    #[test]
    fn test_custom_indent_width() {
        let pretty = pretty_print_with_indent("<a><b/></a>", 4).unwrap();
        assert_eq!(pretty, "<a>\n    <b/>\n</a>");
    }

    #[test]
    fn test_malformed_inputs_fail() {
        for bad in [
            "",
            "<a>",
            "<a></b>",
            "</a>",
            "<a/><b/>",
            "text<a/>",
            "<a x=\"1\" x=\"2\"/>",
        ] {
            let result = pretty_print(bad);
            assert!(
                matches!(result, Err(ConvertError::XmlFormat(_))),
                "expected failure for {:?}, got {:?}",
                bad,
                result
            );
        }
    }

    fn omml_strategy() -> impl Strategy<Value = String> {
        let leaf = "[a-z0-9α-ω+=]{1,3}".prop_map(|t| format!("<m:r><m:t>{}</m:t></m:r>", t));
        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| format!("<m:f><m:num>{}</m:num><m:den>{}</m:den></m:f>", a, b)),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| format!("<m:sSup><m:e>{}</m:e><m:sup>{}</m:sup></m:sSup>", a, b)),
                inner.prop_map(|a| format!(
                    "<m:rad><m:radPr><m:degHide m:val=\"1\"/></m:radPr><m:deg/><m:e>{}</m:e></m:rad>",
                    a
                )),
            ]
        })
        .prop_map(|body| {
            format!(
                "<m:oMathPara xmlns:m=\"http://schemas.openxmlformats.org/officeDocument/2006/math\"><m:oMath>{}</m:oMath></m:oMathPara>",
                body
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_pretty_print_preserves_structure(xml in omml_strategy()) {
            let pretty = pretty_print(&xml);
            prop_assert!(pretty.is_ok(), "pretty print failed: {:?}", pretty.err());
            let pretty = pretty.unwrap();
            prop_assert_eq!(parse_dom(&xml), parse_dom(&pretty));
        }
    }
}
