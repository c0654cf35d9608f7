// Minimal XML string builder shared by the MathML and OMML writers.

use super::escape::push_escaped;

/// Incremental XML writer over a `String` buffer.
///
/// The builder does not track open elements; callers emit balanced
/// `start`/`end` pairs, which the serializers guarantee by construction.
#[derive(Debug, Default)]
pub struct XmlBuilder {
    buffer: String,
}

impl XmlBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    /// Write `<tag>`.
    #[inline]
    pub fn start(&mut self, tag: &str) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.buffer.push('>');
    }

    /// Write `<tag a="v" ...>`.
    pub fn start_with_attrs(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.push_attrs(attrs);
        self.buffer.push('>');
    }

    /// Write `</tag>`.
    #[inline]
    pub fn end(&mut self, tag: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(tag);
        self.buffer.push('>');
    }

    /// Write a self-closing `<tag a="v"/>`.
    pub fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.push_attrs(attrs);
        self.buffer.push_str("/>");
    }

    /// Write escaped character data.
    #[inline]
    pub fn text(&mut self, text: &str) {
        push_escaped(&mut self.buffer, text);
    }

    /// Write `<tag>text</tag>`.
    pub fn leaf(&mut self, tag: &str, text: &str) {
        self.start(tag);
        self.text(text);
        self.end(tag);
    }

    fn push_attrs(&mut self, attrs: &[(&str, &str)]) {
        for (key, value) in attrs {
            self.buffer.push(' ');
            self.buffer.push_str(key);
            self.buffer.push_str("=\"");
            push_escaped(&mut self.buffer, value);
            self.buffer.push('"');
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_output() {
        let mut xml = XmlBuilder::default();
        xml.start_with_attrs("m:oMathPara", &[("xmlns:m", "urn:x")]);
        xml.leaf("m:t", "a<b");
        xml.empty("m:chr", &[("m:val", "\"")]);
        xml.end("m:oMathPara");
        assert_eq!(
            xml.finish(),
            r#"<m:oMathPara xmlns:m="urn:x"><m:t>a&lt;b</m:t><m:chr m:val="&quot;"/></m:oMathPara>"#
        );
    }
}
