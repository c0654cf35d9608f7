// Recursive-descent LaTeX parser
//
// Consumes tokens with a single token of lookahead and produces a MathNode
// tree through FormulaBuilder. Only an unterminated group or environment
// and malformed matrices are fatal; unknown commands become `Unsupported`
// nodes so that callers can report the offending name.

use std::iter::Peekable;

use super::lexer::{Lexer, Token};
use super::symbols::{self, TextCommand};
use crate::formula::ast::{FormulaBuilder, LargeOperator, MathNode, Symbol};
use crate::formula::error::ParseError;

/// Maximum group nesting depth to prevent stack overflow
const MAX_DEPTH: usize = 128;

/// Parse repaired LaTeX into a formula tree.
///
/// # Examples
///
/// ```
/// use formula_convert::formula::{parse, MathNode};
///
/// let tree = parse(r"\frac{a}{b}").unwrap();
/// assert!(matches!(tree, MathNode::Frac { .. }));
/// ```
pub fn parse(latex: &str) -> Result<MathNode, ParseError> {
    LatexParser::new(latex).parse()
}

/// Where a sequence of atoms ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Terminator {
    /// End of input; stray closers are skipped
    Eof,
    /// `}`, consumed
    Group,
    /// `]` of an optional argument, consumed
    Bracket,
    /// `&`, `\\` or `\end`, left for the environment parser
    Cell,
}

pub struct LatexParser<'a> {
    pub(super) tokens: Peekable<Lexer<'a>>,
    depth: usize,
}

impl<'a> LatexParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: Lexer::new(input).peekable(),
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<MathNode, ParseError> {
        let nodes = self.parse_sequence(Terminator::Eof)?;
        Ok(FormulaBuilder::row(nodes))
    }

    pub(super) fn parse_sequence(
        &mut self,
        terminator: Terminator,
    ) -> Result<Vec<MathNode>, ParseError> {
        self.enter()?;

        let mut nodes = Vec::new();
        loop {
            let Some(token) = self.tokens.peek() else {
                match terminator {
                    Terminator::Eof => break,
                    Terminator::Group => {
                        return Err(ParseError::UnexpectedEof("unterminated group".to_string()));
                    },
                    Terminator::Bracket => {
                        return Err(ParseError::UnexpectedEof(
                            "unterminated optional argument".to_string(),
                        ));
                    },
                    Terminator::Cell => {
                        return Err(ParseError::UnexpectedEof(
                            "unterminated environment".to_string(),
                        ));
                    },
                }
            };

            match (terminator, token) {
                (Terminator::Group, Token::EndGroup) => {
                    self.tokens.next();
                    break;
                },
                (Terminator::Bracket, Token::Char(']')) => {
                    self.tokens.next();
                    break;
                },
                (Terminator::Cell, Token::Alignment | Token::RowSeparator) => break,
                (Terminator::Cell, Token::Command(name)) if name == "end" => break,
                // Stray closers and separators outside their context
                (Terminator::Eof, Token::EndGroup)
                | (Terminator::Eof | Terminator::Group | Terminator::Bracket, Token::Alignment)
                | (Terminator::Eof | Terminator::Group | Terminator::Bracket, Token::RowSeparator) => {
                    self.tokens.next();
                    continue;
                },
                _ => {},
            }

            let atom = match self.tokens.peek() {
                // Script with no preceding atom attaches to an empty base
                Some(Token::Superscript | Token::Subscript) => Some(MathNode::empty()),
                _ => match self.tokens.next() {
                    Some(token) => self.parse_atom(token)?,
                    None => None,
                },
            };
            if let Some(atom) = atom {
                let node = self.parse_scripts(atom)?;
                nodes.push(node);
            }
        }

        self.depth -= 1;
        Ok(nodes)
    }

    /// Count one level of nesting, failing past `MAX_DEPTH`.
    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn parse_atom(&mut self, token: Token) -> Result<Option<MathNode>, ParseError> {
        let node = match token {
            Token::Whitespace => return Ok(None),
            Token::BeginGroup => {
                let nodes = self.parse_sequence(Terminator::Group)?;
                FormulaBuilder::row(nodes)
            },
            Token::Char(c) if c.is_ascii_digit() => self.parse_number(c),
            // Non-breaking space
            Token::Char('~') => return Ok(None),
            Token::Char(c) => char_node(c),
            Token::Command(name) => return self.parse_command(&name),
            Token::EndGroup
            | Token::Alignment
            | Token::RowSeparator
            | Token::Superscript
            | Token::Subscript => return Ok(None),
        };
        Ok(Some(node))
    }

    fn parse_number(&mut self, first: char) -> MathNode {
        let mut digits = String::from(first);
        while let Some(Token::Char(c)) = self
            .tokens
            .next_if(|t| matches!(t, Token::Char(c) if c.is_ascii_digit() || *c == '.'))
        {
            digits.push(c);
        }
        MathNode::Symbol(Symbol::number(digits))
    }

    /// Apply any `^`, `_` and `'` suffixes to `base`.
    fn parse_scripts(&mut self, mut base: MathNode) -> Result<MathNode, ParseError> {
        loop {
            self.skip_whitespace();
            match self.tokens.peek() {
                Some(Token::Superscript) => {
                    self.tokens.next();
                    let script = self.parse_argument()?;
                    base = FormulaBuilder::attach_upper(base, script);
                },
                Some(Token::Subscript) => {
                    self.tokens.next();
                    let script = self.parse_argument()?;
                    base = FormulaBuilder::attach_lower(base, script);
                },
                Some(Token::Char('\'')) => {
                    let mut count = 0;
                    while self.tokens.next_if_eq(&Token::Char('\'')).is_some() {
                        count += 1;
                    }
                    let prime = match count {
                        1 => "\u{2032}",
                        2 => "\u{2033}",
                        _ => "\u{2034}",
                    };
                    base = FormulaBuilder::superscript(base, MathNode::Symbol(Symbol::operator(prime)));
                },
                _ => return Ok(base),
            }
        }
    }

    /// Read one argument: a braced group, a single command or a single
    /// character. A missing argument yields the empty group.
    ///
    /// Unbraced arguments nest (`\hat\hat x`), so each one counts toward
    /// the depth limit.
    pub(super) fn parse_argument(&mut self) -> Result<MathNode, ParseError> {
        self.enter()?;
        let argument = self.parse_argument_inner()?;
        self.depth -= 1;
        Ok(argument)
    }

    fn parse_argument_inner(&mut self) -> Result<MathNode, ParseError> {
        self.skip_whitespace();
        match self.tokens.peek() {
            None
            | Some(Token::EndGroup)
            | Some(Token::Alignment)
            | Some(Token::RowSeparator)
            | Some(Token::Superscript)
            | Some(Token::Subscript) => Ok(MathNode::empty()),
            Some(Token::BeginGroup) => {
                self.tokens.next();
                let nodes = self.parse_sequence(Terminator::Group)?;
                Ok(FormulaBuilder::row(nodes))
            },
            Some(Token::Char(c)) => {
                let node = char_node(*c);
                self.tokens.next();
                Ok(node)
            },
            Some(_) => match self.tokens.next() {
                Some(token) => Ok(self.parse_atom(token)?.unwrap_or_else(MathNode::empty)),
                None => Ok(MathNode::empty()),
            },
        }
    }

    fn parse_command(&mut self, name: &str) -> Result<Option<MathNode>, ParseError> {
        if symbols::is_ignored(name) {
            return Ok(None);
        }
        if symbols::is_sizing(name) {
            return Ok(self.parse_delimiter());
        }
        if let Some(letter) = symbols::greek_letter(name) {
            return Ok(Some(MathNode::Greek(letter)));
        }
        if let Some(symbol) = symbols::symbol(name) {
            return Ok(Some(MathNode::Symbol(symbol)));
        }
        if symbols::is_function(name) {
            return Ok(Some(MathNode::Symbol(Symbol::identifier(name))));
        }
        if let Some(operator) = symbols::large_operator(name) {
            return Ok(Some(FormulaBuilder::large_op(operator, None, None, None)));
        }
        if let Some(accent) = symbols::accent(name) {
            let base = self.parse_argument()?;
            return Ok(Some(FormulaBuilder::accent(accent, base)));
        }
        if symbols::is_font_style(name) {
            return self.parse_argument().map(Some);
        }
        if let Some(kind) = symbols::text_command(name) {
            let raw = self.read_raw_argument()?;
            return Ok(text_node(kind, &raw));
        }

        let node = match name {
            "frac" | "dfrac" | "tfrac" | "cfrac" => {
                let numerator = self.parse_argument()?;
                let denominator = self.parse_argument()?;
                FormulaBuilder::frac(numerator, denominator)
            },
            "sqrt" => {
                self.skip_whitespace();
                if self.tokens.next_if_eq(&Token::Char('[')).is_some() {
                    let index = self.parse_sequence(Terminator::Bracket)?;
                    let radicand = self.parse_argument()?;
                    FormulaBuilder::root(FormulaBuilder::row(index), radicand)
                } else {
                    FormulaBuilder::sqrt(self.parse_argument()?)
                }
            },
            "not" => match self.parse_argument()? {
                MathNode::Symbol(symbol) => MathNode::Symbol(negate(symbol)),
                other => other,
            },
            "hspace" | "vspace" | "phantom" | "hphantom" | "vphantom" => {
                self.read_raw_argument()?;
                return Ok(None);
            },
            "begin" => {
                let env = self.read_raw_argument()?;
                return self.parse_environment(env.trim()).map(Some);
            },
            "end" => {
                // Stray \end outside any environment
                self.read_raw_argument()?;
                return Ok(None);
            },
            _ => MathNode::Unsupported(format!("\\{}", name)),
        };
        Ok(Some(node))
    }

    /// Delimiter following `\left`, `\right` or a `\big` variant.
    fn parse_delimiter(&mut self) -> Option<MathNode> {
        self.skip_whitespace();
        match self.tokens.peek()? {
            Token::Char('.') => {
                self.tokens.next();
                None
            },
            Token::Char(c) => {
                let node = MathNode::Symbol(Symbol::operator(*c));
                self.tokens.next();
                Some(node)
            },
            Token::Command(name) => {
                let symbol = symbols::symbol(name)?;
                self.tokens.next();
                Some(MathNode::Symbol(symbol))
            },
            _ => None,
        }
    }

    /// Collect the literal text of a braced argument, or of a single
    /// following character when the braces are missing.
    pub(super) fn read_raw_argument(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        match self.tokens.next() {
            Some(Token::BeginGroup) => {},
            Some(Token::Char(c)) => return Ok(c.to_string()),
            _ => return Ok(String::new()),
        }

        let mut text = String::new();
        let mut depth = 1usize;
        loop {
            match self.tokens.next() {
                None => return Err(ParseError::UnexpectedEof("unterminated group".to_string())),
                Some(Token::BeginGroup) => depth += 1,
                Some(Token::EndGroup) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                },
                Some(Token::Char(c)) => text.push(c),
                Some(Token::Whitespace) => text.push(' '),
                Some(Token::Superscript) => text.push('^'),
                Some(Token::Subscript) => text.push('_'),
                Some(Token::Alignment) => text.push('&'),
                Some(Token::RowSeparator) => {},
                Some(Token::Command(name)) => match symbols::symbol(&name) {
                    Some(symbol) => text.push_str(&symbol.text),
                    None => match symbols::greek_letter(&name) {
                        Some(letter) => text.push(letter.glyph),
                        None if symbols::is_ignored(&name) => text.push(' '),
                        None => {
                            text.push('\\');
                            text.push_str(&name);
                        },
                    },
                },
            }
        }
    }

    pub(super) fn skip_whitespace(&mut self) {
        while self.tokens.next_if_eq(&Token::Whitespace).is_some() {}
    }
}

/// A literal character; raw big-operator glyphs (`∑`, `∫`) open a large
/// operator just like their commands do.
fn char_node(c: char) -> MathNode {
    let mut buf = [0u8; 4];
    match LargeOperator::from_glyph(c.encode_utf8(&mut buf)) {
        Some(operator) => FormulaBuilder::large_op(operator, None, None, None),
        None => MathNode::Symbol(Symbol::from_char(c)),
    }
}

fn text_node(kind: TextCommand, raw: &str) -> Option<MathNode> {
    let node = match kind {
        TextCommand::Text => {
            if raw.is_empty() {
                return None;
            }
            MathNode::Symbol(Symbol::text(raw))
        },
        TextCommand::Upright => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed.chars().all(|c| c.is_ascii_digit()) {
                MathNode::Symbol(Symbol::number(trimmed))
            } else {
                MathNode::Symbol(Symbol::identifier(trimmed))
            }
        },
        TextCommand::Script | TextCommand::DoubleStruck => {
            let map = match kind {
                TextCommand::Script => symbols::script_letter,
                _ => symbols::double_struck_letter,
            };
            let letters: Vec<MathNode> = raw
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| MathNode::Symbol(Symbol::identifier(map(c))))
                .collect();
            if letters.is_empty() {
                return None;
            }
            FormulaBuilder::group(letters)
        },
    };
    Some(node)
}

fn negate(symbol: Symbol) -> Symbol {
    let negated = match symbol.text.as_str() {
        "=" => "\u{2260}",
        "\u{2208}" => "\u{2209}",
        "<" => "\u{226E}",
        ">" => "\u{226F}",
        "\u{2264}" => "\u{2270}",
        "\u{2265}" => "\u{2271}",
        "\u{2282}" => "\u{2284}",
        "\u{2283}" => "\u{2285}",
        "\u{2261}" => "\u{2262}",
        _ => {
            let mut text = symbol.text;
            text.push('\u{0338}');
            return Symbol::operator(text);
        },
    };
    Symbol::operator(negated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::ast::{AccentType, LargeOperator, SymbolKind};

    fn ident(s: &str) -> MathNode {
        MathNode::Symbol(Symbol::identifier(s))
    }

    fn num(s: &str) -> MathNode {
        MathNode::Symbol(Symbol::number(s))
    }

    #[test]
    fn test_simple_fraction() {
        assert_eq!(
            parse(r"\frac{a}{b}").unwrap(),
            FormulaBuilder::frac(ident("a"), ident("b"))
        );
    }

    #[test]
    fn test_digit_runs_form_one_number() {
        assert_eq!(
            parse("x=3.14").unwrap(),
            MathNode::Group(vec![
                ident("x"),
                MathNode::Symbol(Symbol::operator("=")),
                num("3.14"),
            ])
        );
    }

    #[test]
    fn test_script_takes_single_digit() {
        let tree = parse("x^23").unwrap();
        assert_eq!(
            tree,
            MathNode::Group(vec![
                FormulaBuilder::superscript(ident("x"), num("2")),
                num("3"),
            ])
        );
    }

    #[test]
    fn test_subsup_either_order() {
        let a = parse("x_i^2").unwrap();
        let b = parse("x^2_i").unwrap();
        assert_eq!(a, b);
        assert!(matches!(a, MathNode::SubSup { .. }));
    }

    #[test]
    fn test_greek_and_unsupported() {
        let tree = parse(r"\alpha + \xyzcommand").unwrap();
        assert_eq!(tree.find_unsupported(), Some("\\xyzcommand"));
        match tree {
            MathNode::Group(children) => {
                assert!(matches!(&children[0], MathNode::Greek(g) if g.glyph == 'α'))
            },
            other => panic!("Expected Group, got {:?}", other),
        }
    }

    #[test]
    fn test_sqrt_with_index() {
        assert_eq!(
            parse(r"\sqrt[3]{x}").unwrap(),
            FormulaBuilder::root(num("3"), ident("x"))
        );
        assert_eq!(parse(r"\sqrt x").unwrap(), FormulaBuilder::sqrt(ident("x")));
    }

    #[test]
    fn test_large_operator_bounds_and_body() {
        let tree = parse(r"\sum_{i=1}^{n} i^2 + 1").unwrap();
        match tree {
            MathNode::Group(children) => {
                assert_eq!(children.len(), 3);
                match &children[0] {
                    MathNode::LargeOp {
                        operator,
                        lower,
                        upper,
                        body,
                    } => {
                        assert_eq!(*operator, LargeOperator::Sum);
                        assert!(lower.is_some());
                        assert_eq!(upper.as_deref(), Some(&ident("n")));
                        assert!(matches!(body.as_deref(), Some(MathNode::Superscript { .. })));
                    },
                    other => panic!("Expected LargeOp, got {:?}", other),
                }
            },
            other => panic!("Expected Group, got {:?}", other),
        }
    }

    #[test]
    fn test_limit_operator() {
        let tree = parse(r"\lim_{x \to 0} f").unwrap();
        assert!(matches!(
            tree,
            MathNode::LargeOp {
                operator: LargeOperator::Limit,
                lower: Some(_),
                upper: None,
                body: Some(_),
            }
        ));
    }

    #[test]
    fn test_accent_and_text() {
        assert_eq!(
            parse(r"\hat{x}").unwrap(),
            FormulaBuilder::accent(AccentType::Hat, ident("x"))
        );
        assert_eq!(
            parse(r"\text{if } x").unwrap(),
            MathNode::Group(vec![MathNode::Symbol(Symbol::text("if ")), ident("x")])
        );
        assert_eq!(parse(r"\mathrm{d}").unwrap(), ident("d"));
        assert_eq!(parse(r"\mathbb{R}").unwrap(), ident("ℝ"));
        assert_eq!(parse(r"\mathcal L").unwrap(), ident("ℒ"));
    }

    #[test]
    fn test_functions_are_upright_identifiers() {
        let tree = parse(r"\sin x").unwrap();
        match tree {
            MathNode::Group(children) => {
                assert_eq!(children[0], ident("sin"));
                assert_eq!(children[1], ident("x"));
            },
            other => panic!("Expected Group, got {:?}", other),
        }
    }

    #[test]
    fn test_left_right_are_transparent() {
        assert_eq!(
            parse(r"\left( x \right)").unwrap(),
            MathNode::Group(vec![
                MathNode::Symbol(Symbol::operator("(")),
                ident("x"),
                MathNode::Symbol(Symbol::operator(")")),
            ])
        );
        assert_eq!(parse(r"\left. x \right|").unwrap().node_count(), 3);
    }

    #[test]
    fn test_spacing_and_style_dropped() {
        assert_eq!(parse(r"a\,b").unwrap(), parse("ab").unwrap());
        assert_eq!(parse(r"\mathbf{v}").unwrap(), ident("v"));
    }

    #[test]
    fn test_prime_and_not() {
        assert_eq!(
            parse("f'").unwrap(),
            FormulaBuilder::superscript(ident("f"), MathNode::Symbol(Symbol::operator("′")))
        );
        match parse(r"a \not= b").unwrap() {
            MathNode::Group(children) => {
                assert_eq!(children[1], MathNode::Symbol(Symbol::operator("≠")))
            },
            other => panic!("Expected Group, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_group_is_fatal() {
        assert!(matches!(
            parse(r"\frac{a}{b"),
            Err(ParseError::UnexpectedEof(_))
        ));
        assert!(matches!(parse("{x"), Err(ParseError::UnexpectedEof(_))));
    }

    #[test]
    fn test_stray_closer_is_skipped() {
        assert_eq!(parse("x}").unwrap(), ident("x"));
    }

    #[test]
    fn test_leading_script_has_empty_base() {
        match parse("^2").unwrap() {
            MathNode::Superscript { base, .. } => assert!(base.is_empty_group()),
            other => panic!("Expected Superscript, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "{".repeat(MAX_DEPTH + 1), "}".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(ParseError::NestingTooDeep(MAX_DEPTH)));
        let shallow = format!("{}x{}", "{".repeat(10), "}".repeat(10));
        assert_eq!(parse(&shallow).unwrap(), ident("x"));
    }

    #[test]
    fn test_unbraced_arguments_hit_nesting_limit() {
        for command in [r"\hat", r"\sqrt", r"\frac", r"\mathbf", r"\not"] {
            let deep = format!("{}x", command.repeat(5_000));
            assert_eq!(parse(&deep), Err(ParseError::NestingTooDeep(MAX_DEPTH)));
        }
        let chained = format!("{}x", r"\hat".repeat(20));
        assert!(matches!(parse(&chained).unwrap(), MathNode::Accent { .. }));
    }

    #[test]
    fn test_raw_large_operator_glyph() {
        let tree = parse("\u{2211}_{i} a").unwrap();
        match tree {
            MathNode::LargeOp {
                operator: LargeOperator::Sum,
                lower: Some(_),
                upper: None,
                body: Some(body),
            } => assert_eq!(*body, ident("a")),
            other => panic!("Expected LargeOp, got {:?}", other),
        }
        assert!(matches!(
            parse("x^\u{222B}").unwrap(),
            MathNode::Superscript { ref exponent, .. }
                if matches!(**exponent, MathNode::LargeOp { operator: LargeOperator::Integral, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty_group());
        assert!(parse("   ").unwrap().is_empty_group());
    }

    #[test]
    fn test_number_kind() {
        match parse("42").unwrap() {
            MathNode::Symbol(s) => assert_eq!(s.kind, SymbolKind::Number),
            other => panic!("Expected Symbol, got {:?}", other),
        }
    }
}
