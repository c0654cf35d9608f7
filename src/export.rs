//! Caller-facing outputs built on the formula pipeline.
//!
//! Clipboard text wrapping, multi-format clipboard payloads and batch
//! documents. Batch builders never abort: a formula that fails to convert is
//! written as plain text with a `(conversion failed)` marker and the batch
//! continues.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::xml::XmlBuilder;
use crate::formula::{Converter, MathmlWriter, default_converter, to_omml};

/// WordprocessingML main namespace
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const FAILED_MARKER: &str = " (conversion failed)";

/// Math-mode delimiters used when copying LaTeX as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapStyle {
    /// `\( ... \)`
    #[default]
    Inline,
    /// `\[ ... \]`
    Display,
}

impl WrapStyle {
    #[inline]
    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            WrapStyle::Inline => ("\\(", "\\)"),
            WrapStyle::Display => ("\\[", "\\]"),
        }
    }
}

/// Surround `latex` with the delimiters of `style`.
///
/// The input is copied verbatim, even when it already contains delimiters.
///
/// ```
/// use formula_convert::export::{WrapStyle, wrap};
///
/// assert_eq!(wrap("x^2", WrapStyle::Inline), r"\(x^2\)");
/// assert_eq!(wrap("", WrapStyle::Display), r"\[\]");
/// ```
pub fn wrap(latex: &str, style: WrapStyle) -> String {
    let (open, close) = style.delimiters();
    let mut out = String::with_capacity(latex.len() + open.len() + close.len());
    out.push_str(open);
    out.push_str(latex);
    out.push_str(close);
    out
}

/// Formats offered together when copying a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardPayload {
    pub latex: String,
    pub mathml: Option<String>,
    /// Word reads this as a live equation when pasted
    pub omml: Option<String>,
}

impl ClipboardPayload {
    /// Whether only the LaTeX text is available.
    pub fn is_text_only(&self) -> bool {
        self.mathml.is_none() && self.omml.is_none()
    }
}

/// Build a clipboard payload with the default converter.
pub fn clipboard_payload(latex: &str) -> ClipboardPayload {
    clipboard_payload_with(default_converter(), latex)
}

/// Build a clipboard payload; any conversion failure leaves LaTeX only.
pub fn clipboard_payload_with(converter: &Converter, latex: &str) -> ClipboardPayload {
    let converted = converter.parse(latex).and_then(|tree| {
        let mathml = MathmlWriter::new(converter.display()).write(&tree)?;
        Ok((mathml, to_omml(&tree)?))
    });
    match converted {
        Ok((mathml, omml)) => ClipboardPayload {
            latex: latex.to_string(),
            mathml: Some(mathml),
            omml: Some(omml),
        },
        Err(e) => {
            log::debug!("clipboard falls back to plain LaTeX: {}", e);
            ClipboardPayload {
                latex: latex.to_string(),
                mathml: None,
                omml: None,
            }
        },
    }
}

/// Join formulas into `.tex` content, one `$$...$$` block per formula.
///
/// ```
/// use formula_convert::export::tex_document;
///
/// assert_eq!(tex_document(&["a", "b"]), "$$a$$\n\n$$b$$");
/// ```
pub fn tex_document<S: AsRef<str>>(formulas: &[S]) -> String {
    formulas
        .iter()
        .map(|latex| format!("$${}$$", latex.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build a WordprocessingML `<w:body>` with one paragraph per formula.
pub fn docx_body<S: AsRef<str> + Sync>(formulas: &[S]) -> String {
    docx_body_with(default_converter(), formulas)
}

/// Build a `<w:body>` with `converter`. Formulas convert in parallel; the
/// paragraphs keep the input order.
pub fn docx_body_with<S: AsRef<str> + Sync>(converter: &Converter, formulas: &[S]) -> String {
    let paragraphs: Vec<String> = formulas
        .par_iter()
        .map(|latex| paragraph(converter, latex.as_ref()))
        .collect();

    let capacity = paragraphs.iter().map(String::len).sum::<usize>() + 16;
    let mut body = String::with_capacity(capacity);
    body.push_str("<w:body>");
    for p in &paragraphs {
        body.push_str(p);
    }
    body.push_str("</w:body>");
    body
}

/// Build a complete `word/document.xml` part around [`docx_body`].
pub fn docx_document<S: AsRef<str> + Sync>(formulas: &[S]) -> String {
    let body = docx_body(formulas);
    let mut xml = XmlBuilder::with_capacity(body.len() + 256);
    xml.start_with_attrs(
        "w:document",
        &[("xmlns:w", WORDML_NS), ("xmlns:m", crate::formula::omml::OMML_NS)],
    );
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str(&xml.finish());
    out.push_str(&body);
    out.push_str("</w:document>");
    out
}

fn paragraph(converter: &Converter, latex: &str) -> String {
    match converter.latex_to_omml(latex) {
        Ok(omml) => {
            let mut p = String::with_capacity(omml.len() + 12);
            p.push_str("<w:p>");
            p.push_str(&omml);
            p.push_str("</w:p>");
            p
        },
        Err(e) => {
            log::debug!("formula written as text: {}", e);
            let mut xml = XmlBuilder::with_capacity(latex.len() + 48);
            xml.start("w:p");
            xml.start("w:r");
            xml.start("w:t");
            xml.text(latex);
            xml.text(FAILED_MARKER);
            xml.end("w:t");
            xml.end("w:r");
            xml.end("w:p");
            xml.finish()
        },
    }
}
