// LaTeX command lookup tables
//
// Static perfect-hash tables mapping command names (without the leading
// backslash) to glyphs and AST classifications.

use crate::formula::ast::{AccentType, GreekLetter, LargeOperator, Symbol, SymbolKind};

static GREEK_LETTERS: phf::Map<&'static str, char> = phf::phf_map! {
    // Lowercase Greek
    "alpha" => 'α',
    "beta" => 'β',
    "gamma" => 'γ',
    "delta" => 'δ',
    "epsilon" => 'ϵ',
    "varepsilon" => 'ε',
    "zeta" => 'ζ',
    "eta" => 'η',
    "theta" => 'θ',
    "vartheta" => 'ϑ',
    "iota" => 'ι',
    "kappa" => 'κ',
    "varkappa" => 'ϰ',
    "lambda" => 'λ',
    "mu" => 'μ',
    "nu" => 'ν',
    "xi" => 'ξ',
    "omicron" => 'ο',
    "pi" => 'π',
    "varpi" => 'ϖ',
    "rho" => 'ρ',
    "varrho" => 'ϱ',
    "sigma" => 'σ',
    "varsigma" => 'ς',
    "tau" => 'τ',
    "upsilon" => 'υ',
    "phi" => 'ϕ',
    "varphi" => 'φ',
    "chi" => 'χ',
    "psi" => 'ψ',
    "omega" => 'ω',

    // Uppercase Greek
    "Gamma" => 'Γ',
    "Delta" => 'Δ',
    "Theta" => 'Θ',
    "Lambda" => 'Λ',
    "Xi" => 'Ξ',
    "Pi" => 'Π',
    "Sigma" => 'Σ',
    "Upsilon" => 'Υ',
    "Phi" => 'Φ',
    "Psi" => 'Ψ',
    "Omega" => 'Ω',
};

static GREEK_BY_GLYPH: phf::Map<char, &'static str> = phf::phf_map! {
    'α' => "alpha",
    'β' => "beta",
    'γ' => "gamma",
    'δ' => "delta",
    'ϵ' => "epsilon",
    'ε' => "varepsilon",
    'ζ' => "zeta",
    'η' => "eta",
    'θ' => "theta",
    'ϑ' => "vartheta",
    'ι' => "iota",
    'κ' => "kappa",
    'ϰ' => "varkappa",
    'λ' => "lambda",
    'μ' => "mu",
    'ν' => "nu",
    'ξ' => "xi",
    'ο' => "omicron",
    'π' => "pi",
    'ϖ' => "varpi",
    'ρ' => "rho",
    'ϱ' => "varrho",
    'σ' => "sigma",
    'ς' => "varsigma",
    'τ' => "tau",
    'υ' => "upsilon",
    'ϕ' => "phi",
    'φ' => "varphi",
    'χ' => "chi",
    'ψ' => "psi",
    'ω' => "omega",
    'Γ' => "Gamma",
    'Δ' => "Delta",
    'Θ' => "Theta",
    'Λ' => "Lambda",
    'Ξ' => "Xi",
    'Π' => "Pi",
    'Σ' => "Sigma",
    'Υ' => "Upsilon",
    'Φ' => "Phi",
    'Ψ' => "Psi",
    'Ω' => "Omega",
};

// Operators, relations, arrows, delimiters and letter-like symbols
static SYMBOLS: phf::Map<&'static str, (&'static str, SymbolKind)> = phf::phf_map! {
    // Binary operators
    "cdot" => ("⋅", SymbolKind::Operator),
    "times" => ("×", SymbolKind::Operator),
    "div" => ("÷", SymbolKind::Operator),
    "pm" => ("±", SymbolKind::Operator),
    "mp" => ("∓", SymbolKind::Operator),
    "ast" => ("∗", SymbolKind::Operator),
    "star" => ("⋆", SymbolKind::Operator),
    "circ" => ("∘", SymbolKind::Operator),
    "bullet" => ("∙", SymbolKind::Operator),
    "oplus" => ("⊕", SymbolKind::Operator),
    "ominus" => ("⊖", SymbolKind::Operator),
    "otimes" => ("⊗", SymbolKind::Operator),
    "odot" => ("⊙", SymbolKind::Operator),
    "cup" => ("∪", SymbolKind::Operator),
    "cap" => ("∩", SymbolKind::Operator),
    "wedge" => ("∧", SymbolKind::Operator),
    "land" => ("∧", SymbolKind::Operator),
    "vee" => ("∨", SymbolKind::Operator),
    "lor" => ("∨", SymbolKind::Operator),
    "setminus" => ("∖", SymbolKind::Operator),
    "dagger" => ("†", SymbolKind::Operator),

    // Relations
    "leq" => ("≤", SymbolKind::Operator),
    "le" => ("≤", SymbolKind::Operator),
    "leqslant" => ("≤", SymbolKind::Operator),
    "geq" => ("≥", SymbolKind::Operator),
    "ge" => ("≥", SymbolKind::Operator),
    "geqslant" => ("≥", SymbolKind::Operator),
    "neq" => ("≠", SymbolKind::Operator),
    "ne" => ("≠", SymbolKind::Operator),
    "approx" => ("≈", SymbolKind::Operator),
    "equiv" => ("≡", SymbolKind::Operator),
    "sim" => ("∼", SymbolKind::Operator),
    "simeq" => ("≃", SymbolKind::Operator),
    "cong" => ("≅", SymbolKind::Operator),
    "propto" => ("∝", SymbolKind::Operator),
    "ll" => ("≪", SymbolKind::Operator),
    "gg" => ("≫", SymbolKind::Operator),
    "in" => ("∈", SymbolKind::Operator),
    "notin" => ("∉", SymbolKind::Operator),
    "ni" => ("∋", SymbolKind::Operator),
    "subset" => ("⊂", SymbolKind::Operator),
    "supset" => ("⊃", SymbolKind::Operator),
    "subseteq" => ("⊆", SymbolKind::Operator),
    "supseteq" => ("⊇", SymbolKind::Operator),
    "perp" => ("⊥", SymbolKind::Operator),
    "parallel" => ("∥", SymbolKind::Operator),
    "mid" => ("∣", SymbolKind::Operator),
    "colon" => (":", SymbolKind::Operator),

    // Arrows
    "to" => ("→", SymbolKind::Operator),
    "rightarrow" => ("→", SymbolKind::Operator),
    "leftarrow" => ("←", SymbolKind::Operator),
    "gets" => ("←", SymbolKind::Operator),
    "leftrightarrow" => ("↔", SymbolKind::Operator),
    "Rightarrow" => ("⇒", SymbolKind::Operator),
    "Leftarrow" => ("⇐", SymbolKind::Operator),
    "Leftrightarrow" => ("⇔", SymbolKind::Operator),
    "implies" => ("⟹", SymbolKind::Operator),
    "iff" => ("⟺", SymbolKind::Operator),
    "mapsto" => ("↦", SymbolKind::Operator),
    "longrightarrow" => ("⟶", SymbolKind::Operator),
    "longleftarrow" => ("⟵", SymbolKind::Operator),
    "uparrow" => ("↑", SymbolKind::Operator),
    "downarrow" => ("↓", SymbolKind::Operator),

    // Logic
    "forall" => ("∀", SymbolKind::Operator),
    "exists" => ("∃", SymbolKind::Operator),
    "neg" => ("¬", SymbolKind::Operator),
    "lnot" => ("¬", SymbolKind::Operator),
    "therefore" => ("∴", SymbolKind::Operator),
    "because" => ("∵", SymbolKind::Operator),

    // Dots
    "ldots" => ("…", SymbolKind::Operator),
    "dots" => ("…", SymbolKind::Operator),
    "cdots" => ("⋯", SymbolKind::Operator),
    "vdots" => ("⋮", SymbolKind::Operator),
    "ddots" => ("⋱", SymbolKind::Operator),

    // Delimiters
    "langle" => ("⟨", SymbolKind::Operator),
    "rangle" => ("⟩", SymbolKind::Operator),
    "lceil" => ("⌈", SymbolKind::Operator),
    "rceil" => ("⌉", SymbolKind::Operator),
    "lfloor" => ("⌊", SymbolKind::Operator),
    "rfloor" => ("⌋", SymbolKind::Operator),
    "lbrace" => ("{", SymbolKind::Operator),
    "rbrace" => ("}", SymbolKind::Operator),
    "lbrack" => ("[", SymbolKind::Operator),
    "rbrack" => ("]", SymbolKind::Operator),
    "vert" => ("|", SymbolKind::Operator),
    "lvert" => ("|", SymbolKind::Operator),
    "rvert" => ("|", SymbolKind::Operator),
    "Vert" => ("‖", SymbolKind::Operator),
    "lVert" => ("‖", SymbolKind::Operator),
    "rVert" => ("‖", SymbolKind::Operator),
    "{" => ("{", SymbolKind::Operator),
    "}" => ("}", SymbolKind::Operator),
    "|" => ("‖", SymbolKind::Operator),

    // Escaped characters
    "%" => ("%", SymbolKind::Operator),
    "$" => ("$", SymbolKind::Operator),
    "#" => ("#", SymbolKind::Operator),
    "&" => ("&", SymbolKind::Operator),
    "_" => ("_", SymbolKind::Operator),

    // Letter-like symbols
    "infty" => ("∞", SymbolKind::Identifier),
    "partial" => ("∂", SymbolKind::Identifier),
    "nabla" => ("∇", SymbolKind::Identifier),
    "emptyset" => ("∅", SymbolKind::Identifier),
    "varnothing" => ("∅", SymbolKind::Identifier),
    "hbar" => ("ℏ", SymbolKind::Identifier),
    "ell" => ("ℓ", SymbolKind::Identifier),
    "aleph" => ("ℵ", SymbolKind::Identifier),
    "Re" => ("ℜ", SymbolKind::Identifier),
    "Im" => ("ℑ", SymbolKind::Identifier),
    "wp" => ("℘", SymbolKind::Identifier),
    "angle" => ("∠", SymbolKind::Identifier),
    "triangle" => ("△", SymbolKind::Identifier),
    "prime" => ("′", SymbolKind::Operator),
    "degree" => ("°", SymbolKind::Operator),
};

// Named functions rendered as upright multi-letter identifiers
static FUNCTIONS: phf::Set<&'static str> = phf::phf_set! {
    "sin", "cos", "tan", "cot", "sec", "csc",
    "arcsin", "arccos", "arctan",
    "sinh", "cosh", "tanh", "coth",
    "log", "ln", "lg", "exp",
    "det", "dim", "ker", "hom", "deg", "arg",
    "max", "min", "sup", "inf",
    "gcd", "Pr", "mod", "bmod", "argmax", "argmin",
};

static LARGE_OPERATORS: phf::Map<&'static str, LargeOperator> = phf::phf_map! {
    "sum" => LargeOperator::Sum,
    "prod" => LargeOperator::Product,
    "coprod" => LargeOperator::Coproduct,
    "int" => LargeOperator::Integral,
    "iint" => LargeOperator::DoubleIntegral,
    "iiint" => LargeOperator::TripleIntegral,
    "oint" => LargeOperator::ContourIntegral,
    "bigcup" => LargeOperator::BigUnion,
    "bigcap" => LargeOperator::BigIntersection,
    "bigoplus" => LargeOperator::BigOPlus,
    "bigotimes" => LargeOperator::BigOTimes,
    "bigvee" => LargeOperator::BigVee,
    "bigwedge" => LargeOperator::BigWedge,
    "lim" => LargeOperator::Limit,
    "limsup" => LargeOperator::LimSup,
    "liminf" => LargeOperator::LimInf,
};

static ACCENTS: phf::Map<&'static str, AccentType> = phf::phf_map! {
    "hat" => AccentType::Hat,
    "widehat" => AccentType::Hat,
    "bar" => AccentType::Bar,
    "overline" => AccentType::Bar,
    "vec" => AccentType::Vec,
    "overrightarrow" => AccentType::Vec,
    "dot" => AccentType::Dot,
    "ddot" => AccentType::DDot,
    "tilde" => AccentType::Tilde,
    "widetilde" => AccentType::Tilde,
    "check" => AccentType::Check,
    "breve" => AccentType::Breve,
    "acute" => AccentType::Acute,
    "grave" => AccentType::Grave,
};

// Commands with no structural effect, dropped by the parser
static IGNORED: phf::Set<&'static str> = phf::phf_set! {
    ",", ";", ":", "!", " ", ">",
    "quad", "qquad", "enspace", "thinspace", "medspace", "thickspace",
    "displaystyle", "textstyle", "scriptstyle", "scriptscriptstyle",
    "limits", "nolimits", "nonumber", "notag", "hline",
};

// Delimiter sizing prefixes; the delimiter that follows is kept
static SIZING: phf::Set<&'static str> = phf::phf_set! {
    "left", "right", "middle",
    "big", "Big", "bigg", "Bigg",
    "bigl", "Bigl", "biggl", "Biggl",
    "bigr", "Bigr", "biggr", "Biggr",
    "bigm", "Bigm",
};

// Font switches whose argument is parsed normally, the style is dropped
static FONT_STYLES: phf::Set<&'static str> = phf::phf_set! {
    "mathbf", "mathit", "mathsf", "mathtt", "mathnormal",
    "boldsymbol", "bm", "mathfrak",
};

/// How a text-like command turns its raw argument into symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommand {
    /// `\text{..}`: literal text
    Text,
    /// `\mathrm{..}`, `\operatorname{..}`: upright identifier
    Upright,
    /// `\mathcal{..}`: script letters
    Script,
    /// `\mathbb{..}`: double-struck letters
    DoubleStruck,
}

static TEXT_COMMANDS: phf::Map<&'static str, TextCommand> = phf::phf_map! {
    "text" => TextCommand::Text,
    "textrm" => TextCommand::Text,
    "textit" => TextCommand::Text,
    "textbf" => TextCommand::Text,
    "textnormal" => TextCommand::Text,
    "mbox" => TextCommand::Text,
    "mathrm" => TextCommand::Upright,
    "operatorname" => TextCommand::Upright,
    "mathcal" => TextCommand::Script,
    "mathscr" => TextCommand::Script,
    "mathbb" => TextCommand::DoubleStruck,
};

pub fn greek_letter(name: &str) -> Option<GreekLetter> {
    GREEK_LETTERS
        .get_entry(name)
        .map(|(command, glyph)| GreekLetter {
            command,
            glyph: *glyph,
        })
}

pub fn greek_by_glyph(glyph: char) -> Option<GreekLetter> {
    GREEK_BY_GLYPH
        .get(&glyph)
        .map(|command| GreekLetter { command, glyph })
}

pub fn symbol(name: &str) -> Option<Symbol> {
    SYMBOLS
        .get(name)
        .map(|(glyph, kind)| Symbol::new(*glyph, *kind))
}

#[inline]
pub fn is_function(name: &str) -> bool {
    FUNCTIONS.contains(name)
}

#[inline]
pub fn large_operator(name: &str) -> Option<LargeOperator> {
    LARGE_OPERATORS.get(name).copied()
}

#[inline]
pub fn accent(name: &str) -> Option<AccentType> {
    ACCENTS.get(name).copied()
}

#[inline]
pub fn is_ignored(name: &str) -> bool {
    IGNORED.contains(name)
}

#[inline]
pub fn is_sizing(name: &str) -> bool {
    SIZING.contains(name)
}

#[inline]
pub fn is_font_style(name: &str) -> bool {
    FONT_STYLES.contains(name)
}

#[inline]
pub fn text_command(name: &str) -> Option<TextCommand> {
    TEXT_COMMANDS.get(name).copied()
}

/// Mathematical script capital or small letter for `c`.
pub fn script_letter(c: char) -> char {
    let mapped = match c {
        'B' => Some('ℬ'),
        'E' => Some('ℰ'),
        'F' => Some('ℱ'),
        'H' => Some('ℋ'),
        'I' => Some('ℐ'),
        'L' => Some('ℒ'),
        'M' => Some('ℳ'),
        'R' => Some('ℛ'),
        'e' => Some('ℯ'),
        'g' => Some('ℊ'),
        'o' => Some('ℴ'),
        'A'..='Z' => char::from_u32(0x1D49C + (c as u32 - 'A' as u32)),
        'a'..='z' => char::from_u32(0x1D4B6 + (c as u32 - 'a' as u32)),
        _ => None,
    };
    mapped.unwrap_or(c)
}

/// Mathematical double-struck letter or digit for `c`.
pub fn double_struck_letter(c: char) -> char {
    let mapped = match c {
        'C' => Some('ℂ'),
        'H' => Some('ℍ'),
        'N' => Some('ℕ'),
        'P' => Some('ℙ'),
        'Q' => Some('ℚ'),
        'R' => Some('ℝ'),
        'Z' => Some('ℤ'),
        'A'..='Z' => char::from_u32(0x1D538 + (c as u32 - 'A' as u32)),
        'a'..='z' => char::from_u32(0x1D552 + (c as u32 - 'a' as u32)),
        '0'..='9' => char::from_u32(0x1D7D8 + (c as u32 - '0' as u32)),
        _ => None,
    };
    mapped.unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greek_tables_are_inverse() {
        for (command, glyph) in GREEK_LETTERS.entries() {
            assert_eq!(
                greek_by_glyph(*glyph).map(|g| g.command),
                Some(*command),
                "glyph {} does not map back to {}",
                glyph,
                command
            );
        }
        assert_eq!(GREEK_LETTERS.len(), GREEK_BY_GLYPH.len());
    }

    #[test]
    fn test_symbol_lookup() {
        let leq = symbol("leq").unwrap();
        assert_eq!(leq.text, "≤");
        assert_eq!(leq.kind, SymbolKind::Operator);
        assert_eq!(symbol("infty").unwrap().kind, SymbolKind::Identifier);
        assert!(symbol("xyzcommand").is_none());
    }

    #[test]
    fn test_letter_variants() {
        assert_eq!(script_letter('L'), 'ℒ');
        assert_eq!(script_letter('A'), '𝒜');
        assert_eq!(script_letter('1'), '1');
        assert_eq!(double_struck_letter('R'), 'ℝ');
        assert_eq!(double_struck_letter('E'), '𝔼');
    }

    #[test]
    fn test_command_classes() {
        assert!(is_function("sin"));
        assert_eq!(large_operator("sum"), Some(LargeOperator::Sum));
        assert_eq!(accent("widehat"), Some(AccentType::Hat));
        assert!(is_ignored(","));
        assert!(is_sizing("Bigl"));
        assert!(is_font_style("mathbf"));
        assert_eq!(text_command("operatorname"), Some(TextCommand::Upright));
    }
}
