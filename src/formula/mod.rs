// Formula Module - OCR LaTeX to Office Math Conversion
//
// This module turns LaTeX recognized from formula images into documents that
// office applications accept as live equations:
//
// - **Repair**: normalizes OCR output (wrappers, style switches, braces)
// - **LaTeX**: tokenizes and parses the repaired text into a MathNode tree
// - **MathML**: Presentation MathML writer and reader
// - **OMML** (Office Math Markup Language): the format Word stores equations in
//
// Every path goes through the same AST, so MathML and OMML output for one
// formula always describe the same structure.
//
// # Example
//
// ```
// use formula_convert::formula::{latex_to_mathml, latex_to_omml};
//
// let mathml = latex_to_mathml(r"$$x^2 + y^2 = z^2$$").unwrap();
// assert_eq!(mathml.matches("<msup>").count(), 3);
//
// let omml = latex_to_omml(r"\frac{a}{b}").unwrap();
// assert!(omml.starts_with("<m:oMathPara"));
// ```

/// Abstract Syntax Tree for Mathematical Formulas
///
/// Closed set of node kinds shared by every parser and serializer, plus the
/// builder that enforces the script merge rule and matrix rectangularity.
pub mod ast;
mod error;
/// LaTeX Front End
///
/// OCR repair pass and recursive-descent parser.
pub mod latex;
/// Presentation MathML writer and reader
pub mod mathml;
/// OMML (Office Math Markup Language) Writer
pub mod omml;
mod pretty;

use once_cell::sync::Lazy;

// Re-export public API
pub use ast::{
    AccentType, FormulaBuilder, GreekLetter, LargeOperator, MathNode, MatrixFence, Symbol,
    SymbolKind,
};
pub use error::{ConvertError, ParseError, Result};
pub use latex::{ConfigError, LatexParser, RepairConfig, Repairer, parse, repair};
pub use mathml::{MathmlDisplay, MathmlWriter, read_mathml, to_mathml};
pub use omml::{OmmlWriter, to_omml};
pub use pretty::{pretty_print, pretty_print_with_indent};

static DEFAULT_CONVERTER: Lazy<Converter> = Lazy::new(Converter::default);

/// Full repair-parse-serialize pipeline with a fixed configuration.
///
/// A converter holds no mutable state; one instance can serve any number of
/// threads concurrently.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    repairer: Repairer,
    display: MathmlDisplay,
}

impl Converter {
    pub fn new(config: RepairConfig) -> Self {
        Self {
            repairer: Repairer::new(config),
            display: MathmlDisplay::default(),
        }
    }

    /// Set the `display` attribute written on `<math>`.
    pub fn with_display(mut self, display: MathmlDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn config(&self) -> &RepairConfig {
        self.repairer.config()
    }

    pub fn display(&self) -> MathmlDisplay {
        self.display
    }

    pub fn repair(&self, raw: &str) -> String {
        self.repairer.repair(raw)
    }

    /// Repair and parse raw OCR LaTeX.
    ///
    /// Fails with [`ParseError::EmptyInput`] when nothing usable is left
    /// after repair.
    pub fn parse(&self, raw: &str) -> Result<MathNode> {
        let cleaned = self.repairer.repair(raw);
        if cleaned.trim().is_empty() {
            return Err(ParseError::EmptyInput.into());
        }
        let tree = parse(&cleaned)?;
        log::debug!(
            "parsed {} bytes of repaired LaTeX into {} nodes",
            cleaned.len(),
            tree.node_count()
        );
        Ok(tree)
    }

    pub fn latex_to_mathml(&self, raw: &str) -> Result<String> {
        let tree = self.parse(raw)?;
        MathmlWriter::new(self.display).write(&tree)
    }

    pub fn latex_to_omml(&self, raw: &str) -> Result<String> {
        let tree = self.parse(raw)?;
        to_omml(&tree)
    }
}

/// Repair, parse and serialize raw LaTeX as MathML.
pub fn latex_to_mathml(raw: &str) -> Result<String> {
    DEFAULT_CONVERTER.latex_to_mathml(raw)
}

/// Repair, parse and serialize raw LaTeX as OMML.
pub fn latex_to_omml(raw: &str) -> Result<String> {
    DEFAULT_CONVERTER.latex_to_omml(raw)
}

/// Transform a MathML document into OMML.
///
/// Elements the reader does not recognize fail with
/// [`ConvertError::UnsupportedSymbol`] naming the element.
pub fn mathml_to_omml(mathml: &str) -> Result<String> {
    let tree = read_mathml(mathml)?;
    log::debug!("read {} MathML nodes", tree.node_count());
    to_omml(&tree)
}

/// The shared converter behind the free functions.
pub fn default_converter() -> &'static Converter {
    &DEFAULT_CONVERTER
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    /// Read `xml` to the end, failing on any syntax error.
    fn is_well_formed(xml: &str) -> bool {
        let mut reader = Reader::from_str(xml);
        let mut depth = 0i32;
        loop {
            match reader.read_event() {
                Ok(Event::Start(_)) => depth += 1,
                Ok(Event::End(_)) => depth -= 1,
                Ok(Event::Eof) => return depth == 0,
                Ok(_) => {},
                Err(_) => return false,
            }
        }
    }

    #[test]
    fn test_pythagoras() {
        let tree = parse("x^2 + y^2 = z^2").unwrap();
        match &tree {
            MathNode::Group(children) => {
                let powers = children
                    .iter()
                    .filter(|c| matches!(c, MathNode::Superscript { .. }))
                    .count();
                assert_eq!(powers, 3);
                assert_eq!(children.len(), 5);
            },
            other => panic!("Expected Group, got {:?}", other),
        }
        assert_eq!(to_mathml(&tree).unwrap().matches("<msup>").count(), 3);
        assert_eq!(to_omml(&tree).unwrap().matches("<m:sSup>").count(), 3);
    }

    #[test]
    fn test_fraction_mathml() {
        let mathml = latex_to_mathml(r"\frac{a}{b}").unwrap();
        assert_eq!(
            mathml.matches("<mfrac><mi>a</mi><mi>b</mi></mfrac>").count(),
            1
        );
    }

    #[test]
    fn test_nested_braces_repair() {
        assert_eq!(repair("{{{x}}}"), "x");
    }

    #[test]
    fn test_array_repair_then_parse() {
        let repaired = repair(r"\begin{array}{cc}a&b\\c&d\end{array}");
        assert_eq!(repaired, r"\begin{matrix}a&b\\c&d\end{matrix}");
        match parse(&repaired).unwrap() {
            MathNode::Matrix { rows, .. } => {
                assert_eq!(rows.len(), 2);
                assert!(rows.iter().all(|r| r.len() == 2));
            },
            other => panic!("Expected Matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_scenario() {
        // 25 `\,` escapes make up more than half of the input
        let garbage = format!("{}{}", "\\,".repeat(25), "a+b=c".repeat(4));
        assert_eq!(repair(&garbage), "");
        assert_eq!(
            latex_to_omml(&garbage),
            Err(ConvertError::Parse(ParseError::EmptyInput))
        );
    }

    #[test]
    fn test_unsupported_command_scenario() {
        let err = latex_to_mathml(r"\unsupportedcmd{x}").unwrap_err();
        assert!(err.to_string().contains("unsupportedcmd"));
        let err = latex_to_omml(r"\unsupportedcmd{x}").unwrap_err();
        assert!(err.to_string().contains("unsupportedcmd"));
    }

    #[test]
    fn test_subsup_never_nests() {
        let tree = parse("x_i^2").unwrap();
        assert!(matches!(tree, MathNode::SubSup { .. }));
        let mathml = to_mathml(&tree).unwrap();
        assert!(mathml.contains("<msubsup>"));
        assert!(!mathml.contains("<msup>"));
        let omml = to_omml(&tree).unwrap();
        assert!(omml.contains("<m:sSubSup>"));
        assert!(!omml.contains("<m:sSup>"));
    }

    #[test]
    fn test_unknown_command_marks_tree() {
        let tree = parse(r"\sum_{k=0}^{n} \binom").unwrap();
        assert!(!tree.is_well_formed());
        assert_eq!(tree.find_unsupported(), Some(r"\binom"));
    }

    #[test]
    fn test_mathml_to_omml_matches_direct_path() {
        let tree = parse(r"\int_0^1 x^2 \mathrm{d}x = \frac{1}{3}").unwrap();
        let direct = to_omml(&tree).unwrap();
        let via_mathml = mathml_to_omml(&to_mathml(&tree).unwrap()).unwrap();
        assert_eq!(direct, via_mathml);
    }

    #[test]
    fn test_deep_unbraced_input_is_rejected() {
        for command in [r"\hat", r"\sqrt"] {
            let hostile = format!("{}x", command.repeat(5_000));
            assert!(matches!(
                latex_to_omml(&hostile),
                Err(ConvertError::Parse(ParseError::NestingTooDeep(_)))
            ));
        }
        let deep = format!("{}x", r"\sqrt".repeat(100));
        assert_eq!(latex_to_omml(&deep).unwrap().matches("<m:rad>").count(), 100);
        assert_eq!(latex_to_mathml(&deep).unwrap().matches("<msqrt>").count(), 100);
    }

    #[test]
    fn test_raw_operator_glyphs_take_same_path() {
        for latex in ["\u{2211}_{i} a", "\u{222B}_0^1 f", "\\hat{\u{2211}} x", "x^\u{220F}"] {
            let tree = parse(latex).unwrap();
            let direct = to_omml(&tree).unwrap();
            let via_mathml = mathml_to_omml(&to_mathml(&tree).unwrap()).unwrap();
            assert_eq!(direct, via_mathml, "{}", latex);
        }
        assert!(latex_to_omml("\u{2211}_{i} a").unwrap().contains("<m:nary>"));
    }

    #[test]
    fn test_converter_display_and_config() {
        let converter = Converter::new(RepairConfig {
            despaced_words: vec!["arg".to_string()],
            ..RepairConfig::default()
        })
        .with_display(MathmlDisplay::Block);
        let mathml = converter.latex_to_mathml("a r g z").unwrap();
        assert!(mathml.contains(r#"display="block""#));
        assert!(mathml.contains("<mi>a</mi><mi>r</mi><mi>g</mi>"));
        assert_eq!(converter.config().despaced_words, vec!["arg".to_string()]);
    }

    #[test]
    fn test_converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
        assert_eq!(default_converter().display(), MathmlDisplay::Inline);
    }

    #[test]
    fn test_pretty_printed_omml_keeps_content() {
        let omml = latex_to_omml(r"\sqrt{x} + \hat{y}").unwrap();
        let pretty = pretty_print(&omml).unwrap();
        assert!(pretty.contains("\n  <m:oMath>"));
        assert_eq!(
            pretty.lines().map(str::trim).collect::<String>(),
            omml
        );
    }

    fn latex_strategy() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            "[a-z]",
            "[0-9]{1,3}",
            Just(r"\alpha".to_string()),
            Just(r"\pi".to_string()),
            Just(r"\infty".to_string()),
            Just("\u{2211}".to_string()),
            Just("\u{222B}".to_string()),
        ];
        leaf.prop_recursive(4, 48, 4, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!(r"\frac{{{a}}}{{{b}}}")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{{{a}}}^{{{b}}}")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{{{a}}}_{{{b}}}")),
                (inner.clone(), inner.clone(), inner.clone())
                    .prop_map(|(a, b, c)| format!("{{{a}}}_{{{b}}}^{{{c}}}")),
                inner.clone().prop_map(|a| format!(r"\sqrt{{{a}}}")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!(r"\sqrt[{a}]{{{b}}}")),
                (inner.clone(), inner.clone(), inner.clone())
                    .prop_map(|(a, b, c)| format!(r"\sum_{{{a}}}^{{{b}}} {c}")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!(r"\int_{{{a}}} {b}")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!(r"\lim_{{{a}}} {b}")),
                inner.clone().prop_map(|a| format!(r"\hat{{{a}}}")),
                (inner.clone(), inner.clone(), inner.clone(), inner.clone()).prop_map(
                    |(a, b, c, d)| format!(r"\begin{{pmatrix}}{a}&{b}\\{c}&{d}\end{{pmatrix}}")
                ),
                inner.clone().prop_map(|a| format!(r"\left( {a} \right)")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} = {b}")),
                (inner.clone(), inner).prop_map(|(a, b)| format!("{{{a}}}{{{b}}}")),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_serializers_emit_well_formed_xml(latex in latex_strategy()) {
            let tree = parse(&latex).unwrap();
            let mathml = to_mathml(&tree).unwrap();
            prop_assert!(mathml.starts_with("<math"));
            prop_assert!(mathml.ends_with("</math>"));
            prop_assert!(is_well_formed(&mathml));

            let omml = to_omml(&tree).unwrap();
            prop_assert!(omml.starts_with("<m:oMathPara"));
            prop_assert!(omml.ends_with("</m:oMathPara>"));
            prop_assert!(is_well_formed(&omml));
        }

        #[test]
        fn prop_mathml_path_matches_direct_omml(latex in latex_strategy()) {
            let tree = parse(&latex).unwrap();
            let direct = to_omml(&tree).unwrap();
            let via_mathml = mathml_to_omml(&to_mathml(&tree).unwrap()).unwrap();
            prop_assert_eq!(direct, via_mathml);
        }

        #[test]
        fn prop_unknown_command_is_named(suffix in "[a-z]{0,6}", body in latex_strategy()) {
            let command = format!("xyz{}", suffix);
            let latex = format!(r"{} + \{}{{x}}", body, command);
            let err = latex_to_mathml(&latex).unwrap_err();
            prop_assert!(err.to_string().contains(&command));
            let err = latex_to_omml(&latex).unwrap_err();
            prop_assert!(err.to_string().contains(&command));
        }

        #[test]
        fn prop_garbage_is_discarded(count in 21usize..60, filler in "[a-z]{0,10}") {
            let garbage = format!("{}{}", "\\,".repeat(count), filler);
            prop_assert_eq!(repair(&garbage), "");
        }
    }
}
