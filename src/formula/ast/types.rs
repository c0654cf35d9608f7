/// Lexical class of a [`Symbol`], deciding `<mi>`/`<mn>`/`<mo>`/`<mtext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Identifier,
    Number,
    Operator,
    Text,
}

/// Identifier, digit run, operator glyph or literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub text: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(text: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn identifier(text: impl Into<String>) -> Self {
        Self::new(text, SymbolKind::Identifier)
    }

    pub fn number(text: impl Into<String>) -> Self {
        Self::new(text, SymbolKind::Number)
    }

    pub fn operator(text: impl Into<String>) -> Self {
        Self::new(text, SymbolKind::Operator)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, SymbolKind::Text)
    }

    /// Classify a single character the way LaTeX math mode does.
    pub fn from_char(c: char) -> Self {
        let kind = if c.is_ascii_digit() {
            SymbolKind::Number
        } else if c.is_alphabetic() {
            SymbolKind::Identifier
        } else {
            SymbolKind::Operator
        };
        Self::new(c, kind)
    }

    /// Relation and additive operators end the body of a large operator.
    pub fn separates_terms(&self) -> bool {
        self.kind == SymbolKind::Operator && TERM_SEPARATORS.contains(self.text.as_str())
    }
}

static TERM_SEPARATORS: phf::Set<&'static str> = phf::phf_set! {
    "+", "-", "\u{2212}", "=", "<", ">", ",", ";",
    "\u{00B1}", "\u{2213}", "\u{2264}", "\u{2265}", "\u{2260}", "\u{2248}",
    "\u{2261}", "\u{223C}", "\u{2243}", "\u{2245}", "\u{221D}", "\u{226A}", "\u{226B}",
    "\u{2192}", "\u{2190}", "\u{2194}", "\u{21D2}", "\u{21D0}", "\u{21D4}",
    "\u{27F9}", "\u{27FA}", "\u{21A6}",
    "\u{2208}", "\u{2209}", "\u{220B}", "\u{2282}", "\u{2283}", "\u{2286}", "\u{2287}",
};

/// Greek letter with its LaTeX command name and rendered glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreekLetter {
    /// Command name without the backslash (`alpha`)
    pub command: &'static str,
    pub glyph: char,
}

/// Big operators taking optional lower/upper bounds and a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LargeOperator {
    Sum,
    Product,
    Coproduct,
    Integral,
    DoubleIntegral,
    TripleIntegral,
    ContourIntegral,
    BigUnion,
    BigIntersection,
    BigOPlus,
    BigOTimes,
    BigVee,
    BigWedge,
    Limit,
    LimSup,
    LimInf,
}

impl LargeOperator {
    /// Glyph (or upright name, for limits) shown for the operator.
    pub fn glyph(self) -> &'static str {
        match self {
            LargeOperator::Sum => "\u{2211}",
            LargeOperator::Product => "\u{220F}",
            LargeOperator::Coproduct => "\u{2210}",
            LargeOperator::Integral => "\u{222B}",
            LargeOperator::DoubleIntegral => "\u{222C}",
            LargeOperator::TripleIntegral => "\u{222D}",
            LargeOperator::ContourIntegral => "\u{222E}",
            LargeOperator::BigUnion => "\u{22C3}",
            LargeOperator::BigIntersection => "\u{22C2}",
            LargeOperator::BigOPlus => "\u{2A01}",
            LargeOperator::BigOTimes => "\u{2A02}",
            LargeOperator::BigVee => "\u{22C1}",
            LargeOperator::BigWedge => "\u{22C0}",
            LargeOperator::Limit => "lim",
            LargeOperator::LimSup => "lim sup",
            LargeOperator::LimInf => "lim inf",
        }
    }

    pub fn from_glyph(glyph: &str) -> Option<Self> {
        let op = match glyph {
            "\u{2211}" => LargeOperator::Sum,
            "\u{220F}" => LargeOperator::Product,
            "\u{2210}" => LargeOperator::Coproduct,
            "\u{222B}" => LargeOperator::Integral,
            "\u{222C}" => LargeOperator::DoubleIntegral,
            "\u{222D}" => LargeOperator::TripleIntegral,
            "\u{222E}" => LargeOperator::ContourIntegral,
            "\u{22C3}" => LargeOperator::BigUnion,
            "\u{22C2}" => LargeOperator::BigIntersection,
            "\u{2A01}" => LargeOperator::BigOPlus,
            "\u{2A02}" => LargeOperator::BigOTimes,
            "\u{22C1}" => LargeOperator::BigVee,
            "\u{22C0}" => LargeOperator::BigWedge,
            "lim" => LargeOperator::Limit,
            "lim sup" => LargeOperator::LimSup,
            "lim inf" => LargeOperator::LimInf,
            _ => return None,
        };
        Some(op)
    }

    #[inline]
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            LargeOperator::Limit | LargeOperator::LimSup | LargeOperator::LimInf
        )
    }

    #[inline]
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            LargeOperator::Integral
                | LargeOperator::DoubleIntegral
                | LargeOperator::TripleIntegral
                | LargeOperator::ContourIntegral
        )
    }
}

/// Accents placed over a base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccentType {
    Hat,
    Bar,
    Vec,
    Dot,
    DDot,
    Tilde,
    Check,
    Breve,
    Acute,
    Grave,
}

impl AccentType {
    /// Combining character used by both MathML `<mo>` and OMML `m:chr`.
    pub fn combining_char(self) -> char {
        match self {
            AccentType::Hat => '\u{0302}',
            AccentType::Bar => '\u{0305}',
            AccentType::Vec => '\u{20D7}',
            AccentType::Dot => '\u{0307}',
            AccentType::DDot => '\u{0308}',
            AccentType::Tilde => '\u{0303}',
            AccentType::Check => '\u{030C}',
            AccentType::Breve => '\u{0306}',
            AccentType::Acute => '\u{0301}',
            AccentType::Grave => '\u{0300}',
        }
    }

    /// Accept both combining and spacing accent characters.
    pub fn from_char(c: char) -> Option<Self> {
        let accent = match c {
            '\u{0302}' | '^' | '\u{02C6}' => AccentType::Hat,
            '\u{0305}' | '\u{0304}' | '\u{00AF}' | '\u{203E}' => AccentType::Bar,
            '\u{20D7}' | '\u{2192}' => AccentType::Vec,
            '\u{0307}' | '\u{02D9}' => AccentType::Dot,
            '\u{0308}' | '\u{00A8}' => AccentType::DDot,
            '\u{0303}' | '~' | '\u{02DC}' => AccentType::Tilde,
            '\u{030C}' | '\u{02C7}' => AccentType::Check,
            '\u{0306}' | '\u{02D8}' => AccentType::Breve,
            '\u{0301}' | '\u{00B4}' => AccentType::Acute,
            '\u{0300}' | '`' => AccentType::Grave,
            _ => return None,
        };
        Some(accent)
    }
}

/// Delimiters drawn around a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatrixFence {
    #[default]
    None,
    Paren,
    Bracket,
    Brace,
    Bar,
    DoubleBar,
    /// Left brace only (`cases`)
    Cases,
}

impl MatrixFence {
    pub fn from_environment(name: &str) -> Option<Self> {
        let fence = match name {
            "matrix" | "smallmatrix" => MatrixFence::None,
            "pmatrix" => MatrixFence::Paren,
            "bmatrix" => MatrixFence::Bracket,
            "Bmatrix" => MatrixFence::Brace,
            "vmatrix" => MatrixFence::Bar,
            "Vmatrix" => MatrixFence::DoubleBar,
            "cases" => MatrixFence::Cases,
            _ => return None,
        };
        Some(fence)
    }

    pub fn open(self) -> Option<&'static str> {
        match self {
            MatrixFence::None => None,
            MatrixFence::Paren => Some("("),
            MatrixFence::Bracket => Some("["),
            MatrixFence::Brace | MatrixFence::Cases => Some("{"),
            MatrixFence::Bar => Some("|"),
            MatrixFence::DoubleBar => Some("\u{2016}"),
        }
    }

    pub fn close(self) -> Option<&'static str> {
        match self {
            MatrixFence::None | MatrixFence::Cases => None,
            MatrixFence::Paren => Some(")"),
            MatrixFence::Bracket => Some("]"),
            MatrixFence::Brace => Some("}"),
            MatrixFence::Bar => Some("|"),
            MatrixFence::DoubleBar => Some("\u{2016}"),
        }
    }

    /// Recover the fence from the delimiters surrounding a table.
    pub fn from_delimiters(open: Option<&str>, close: Option<&str>) -> Option<Self> {
        [
            MatrixFence::Paren,
            MatrixFence::Bracket,
            MatrixFence::Brace,
            MatrixFence::Bar,
            MatrixFence::DoubleBar,
            MatrixFence::Cases,
        ]
        .into_iter()
        .find(|fence| fence.open() == open && fence.close() == close)
    }
}
