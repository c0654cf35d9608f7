// Individual repair rules
//
// Each rule is a pure `&str -> String` rewrite. The order in RULES is
// significant: later rules assume the wrappers, style switches and
// redundant braces are already gone.

use memchr::{memchr, memmem};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::Repairer;
use super::config::RepairConfig;

pub(super) struct Rule {
    pub name: &'static str,
    pub apply: fn(&str, &Repairer) -> String,
}

pub(super) static RULES: &[Rule] = &[
    Rule {
        name: "strip-math-wrappers",
        apply: |s, _| strip_math_wrappers(s),
    },
    Rule {
        name: "strip-style-commands",
        apply: |s, _| strip_style_commands(s),
    },
    Rule {
        name: "collapse-braces",
        apply: |s, _| collapse_braces(s),
    },
    Rule {
        name: "balance-left-right",
        apply: |s, _| balance_left_right(s),
    },
    Rule {
        name: "array-to-matrix",
        apply: |s, _| array_to_matrix(s),
    },
    Rule {
        name: "unwrap-overlaps",
        apply: |s, _| unwrap_overlaps(s),
    },
    Rule {
        name: "normalize-quads",
        apply: |s, _| normalize_quads(s),
    },
    Rule {
        name: "despace-words",
        apply: |s, repairer| repairer.despace(s),
    },
    Rule {
        name: "strip-trailing-spacing",
        apply: |s, _| strip_trailing_spacing(s),
    },
    Rule {
        name: "unescape-underscore",
        apply: |s, _| unescape_underscore(s),
    },
    Rule {
        name: "remove-empty-braces",
        apply: |s, _| remove_empty_braces(s),
    },
    Rule {
        name: "collapse-whitespace",
        apply: |s, _| collapse_whitespace(s),
    },
];

/// A control word, a control symbol, or `\\` as one unit
static COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\([A-Za-z]+|.)").expect("Failed to build command pattern"));

static SPACING_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[,;!]").expect("Failed to build spacing pattern"));

static LEFT_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\left\s*(?:[()\[\]|./<>]|\\[{}|]|\\[A-Za-z]+)")
        .expect("Failed to build \\left pattern")
});

static RIGHT_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\right\s*(?:[()\[\]|./<>]|\\[{}|]|\\[A-Za-z]+)")
        .expect("Failed to build \\right pattern")
});

static QUAD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\\q?quad\b\s*){3,}").expect("Failed to build quad pattern"));

static TRAILING_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\\[,;!:]\s*)+(?:\\_\s*)?$").expect("Failed to build trailing pattern")
});

const STYLE_COMMANDS: &[&str] = &[
    "displaystyle",
    "textstyle",
    "scriptstyle",
    "scriptscriptstyle",
    "cal",
    "it",
    "bf",
    "rm",
    "limits",
    "nolimits",
];

/// Rewrite every command for which `f` returns a replacement.
fn replace_commands<F>(input: &str, mut f: F) -> String
where
    F: FnMut(&str) -> Option<&'static str>,
{
    if memchr(b'\\', input.as_bytes()).is_none() {
        return input.to_string();
    }
    COMMAND
        .replace_all(input, |caps: &Captures| match f(&caps[1]) {
            Some(replacement) => replacement.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Garbage OCR output: a long run of spacing escapes dominating the input.
pub(super) fn is_garbage(input: &str, config: &RepairConfig) -> bool {
    if input.is_empty() || memchr(b'\\', input.as_bytes()).is_none() {
        return false;
    }
    let (count, covered) = SPACING_ESCAPE
        .find_iter(input)
        .fold((0usize, 0usize), |(count, covered), m| (count + 1, covered + m.len()));
    count > config.garbage_min_count
        && covered as f64 / input.len() as f64 > config.garbage_min_ratio
}

fn strip_math_wrappers(input: &str) -> String {
    let trimmed = input.trim();
    for (open, close) in [("$$", "$$"), ("\\[", "\\]"), ("\\(", "\\)"), ("$", "$")] {
        if trimmed.len() < open.len() + close.len()
            || !trimmed.starts_with(open)
            || !trimmed.ends_with(close)
        {
            continue;
        }
        let inner = &trimmed[open.len()..trimmed.len() - close.len()];
        // `$a$ + $b$` and `\(a\) + \(b\)` are two formulas, not one wrapped formula
        if (open.starts_with('$') && inner.contains('$')) || contains_delimiter(inner, close) {
            continue;
        }
        return inner.to_string();
    }
    trimmed.to_string()
}

/// Whether `delimiter` occurs in `s` as a command rather than after `\\`.
fn contains_delimiter(s: &str, delimiter: &str) -> bool {
    if !delimiter.starts_with('\\') {
        return false;
    }
    let bytes = s.as_bytes();
    s.match_indices(delimiter).any(|(at, _)| {
        let escapes = bytes[..at].iter().rev().take_while(|&&b| b == b'\\').count();
        escapes % 2 == 0
    })
}

fn strip_style_commands(input: &str) -> String {
    replace_commands(input, |name| {
        if STYLE_COMMANDS.contains(&name) {
            Some("")
        } else {
            None
        }
    })
}

/// Partner index for every matched, unescaped brace.
fn match_braces(bytes: &[u8]) -> Vec<Option<usize>> {
    let mut partner = vec![None; bytes.len()];
    let mut stack = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            },
            b'{' => stack.push(i),
            b'}' => {
                if let Some(open) = stack.pop() {
                    partner[open] = Some(i);
                    partner[i] = Some(open);
                }
            },
            _ => {},
        }
        i += 1;
    }
    partner
}

/// `{{X}}` to `{X}` to a fixpoint, then unwrap a pair spanning the whole input.
fn collapse_braces(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let bytes = current.as_bytes();
        let partner = match_braces(bytes);
        let mut removed = vec![false; bytes.len()];
        let mut any = false;
        for open in 0..bytes.len().saturating_sub(1) {
            if bytes[open] != b'{' || bytes[open + 1] != b'{' {
                continue;
            }
            if let (Some(close), Some(inner_close)) = (partner[open], partner[open + 1])
                && close > open
                && inner_close + 1 == close
            {
                removed[open] = true;
                removed[close] = true;
                any = true;
            }
        }
        if !any {
            break;
        }
        // Braces are ASCII, so filtering bytes keeps the string valid UTF-8
        let kept: Vec<u8> = bytes
            .iter()
            .zip(&removed)
            .filter(|&(_, &removed)| !removed)
            .map(|(&b, _)| b)
            .collect();
        current = String::from_utf8_lossy(&kept).into_owned();
    }

    loop {
        let trimmed = current.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'{' {
            break;
        }
        if match_braces(bytes)[0] != Some(bytes.len() - 1) {
            break;
        }
        current = trimmed[1..trimmed.len() - 1].to_string();
    }
    current
}

fn balance_left_right(input: &str) -> String {
    if memmem::find(input.as_bytes(), b"\\left").is_none()
        && memmem::find(input.as_bytes(), b"\\right").is_none()
    {
        return input.to_string();
    }
    let lefts = LEFT_DELIMITER.find_iter(input).count();
    let rights = RIGHT_DELIMITER.find_iter(input).count();
    if lefts > rights {
        let mut out = input.to_string();
        for _ in rights..lefts {
            out.push_str("\\right.");
        }
        out
    } else if rights > lefts {
        let mut out = "\\left.".repeat(rights - lefts);
        out.push_str(input);
        out
    } else {
        input.to_string()
    }
}

/// Byte index just past the brace group opening at `open`.
fn skip_group(input: &str, open: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    match_braces(&bytes[open..])[0].map(|close| open + close + 1)
}

fn array_to_matrix(input: &str) -> String {
    const BEGIN: &str = "\\begin{array}";
    if memmem::find(input.as_bytes(), BEGIN.as_bytes()).is_none() {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(BEGIN) {
        out.push_str(&rest[..pos]);
        out.push_str("\\begin{matrix}");
        let after = &rest[pos + BEGIN.len()..];
        let spec_start = after.len() - after.trim_start().len();
        rest = match skip_group(after, spec_start) {
            Some(end) => &after[end..],
            None => after,
        };
    }
    out.push_str(rest);
    out.replace("\\end{array}", "\\end{matrix}")
}

fn unwrap_overlaps(input: &str) -> String {
    let mut current = input.to_string();
    for command in ["\\rlap", "\\llap"] {
        let mut out = String::with_capacity(current.len());
        let mut rest = current.as_str();
        while let Some(pos) = rest.find(command) {
            let after = &rest[pos + command.len()..];
            out.push_str(&rest[..pos]);
            // `\rlapx` would be a different command
            if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                out.push_str(command);
                rest = after;
                continue;
            }
            let group_start = after.len() - after.trim_start().len();
            match skip_group(after, group_start) {
                Some(end) => {
                    out.push_str(&after[group_start + 1..end - 1]);
                    rest = &after[end..];
                },
                None => {
                    out.push_str(command);
                    rest = after;
                },
            }
        }
        out.push_str(rest);
        current = out;
    }
    current
}

fn normalize_quads(input: &str) -> String {
    if memmem::find(input.as_bytes(), b"quad").is_none() {
        return input.to_string();
    }
    let collapsed = QUAD_RUN.replace_all(input, "\\quad ");
    replace_commands(&collapsed, |name| match name {
        "quad" | "qquad" => Some("\\;"),
        _ => None,
    })
}

/// Build the pattern joining a despaced word, e.g. `\bl n\b` for `ln`.
pub(super) fn despace_pattern(word: &str) -> Option<Regex> {
    let letters: Vec<String> = word.chars().map(|c| regex::escape(&c.to_string())).collect();
    if letters.len() < 2 {
        return None;
    }
    let pattern = format!(r"\b{}\b", letters.join(" "));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::debug!("skipping despaced word {:?}: {}", word, err);
            None
        },
    }
}

fn strip_trailing_spacing(input: &str) -> String {
    TRAILING_SPACING.replace(input, "").into_owned()
}

fn unescape_underscore(input: &str) -> String {
    replace_commands(input, |name| if name == "_" { Some("_") } else { None })
}

/// Drop `{}` except where it is an argument or a script target.
fn remove_empty_braces(input: &str) -> String {
    if memmem::find(input.as_bytes(), b"{}").is_none() {
        return input.to_string();
    }
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'{' && bytes[i + 1] == b'}' && !keeps_empty_group(bytes, i) {
            out.push_str(&input[last..i]);
            last = i + 2;
            i += 2;
            continue;
        }
        i += 1;
    }
    out.push_str(&input[last..]);
    out
}

fn keeps_empty_group(bytes: &[u8], at: usize) -> bool {
    let Some(&prev) = at.checked_sub(1).and_then(|p| bytes.get(p)) else {
        return false;
    };
    match prev {
        b'^' | b'_' | b'}' | b']' => true,
        c if c.is_ascii_alphabetic() => {
            // Letters are a command name only when a backslash starts the run
            let start = bytes[..at]
                .iter()
                .rposition(|b| !b.is_ascii_alphabetic())
                .map(|p| p + 1)
                .unwrap_or(0);
            start > 0 && bytes[start - 1] == b'\\'
        },
        _ => false,
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_math_wrappers() {
        assert_eq!(strip_math_wrappers("$$x^2$$"), "x^2");
        assert_eq!(strip_math_wrappers(" $x$ "), "x");
        assert_eq!(strip_math_wrappers(r"\(a+b\)"), "a+b");
        assert_eq!(strip_math_wrappers(r"\[a\]"), "a");
        assert_eq!(strip_math_wrappers("$a$ + $b$"), "$a$ + $b$");
        assert_eq!(strip_math_wrappers(r"\(a\) + \(b\)"), r"\(a\) + \(b\)");
        assert_eq!(strip_math_wrappers(r"\[a\] = \[b\]"), r"\[a\] = \[b\]");
        // `\\` followed by `)` or `[2pt]` is not a delimiter
        assert_eq!(strip_math_wrappers(r"\(a\\)\)"), r"a\\)");
        assert_eq!(
            strip_math_wrappers(r"\[\begin{matrix}a\\[2pt]b\end{matrix}\]"),
            r"\begin{matrix}a\\[2pt]b\end{matrix}"
        );
    }

    #[test]
    fn test_strip_style_commands() {
        assert_eq!(strip_style_commands(r"\displaystyle x"), " x");
        assert_eq!(strip_style_commands(r"\sum\limits_i"), r"\sum_i");
        assert_eq!(strip_style_commands(r"\bfx"), r"\bfx");
        // Row separator followed by letters is not a command
        assert_eq!(strip_style_commands(r"a\\bf"), r"a\\bf");
    }

    #[test]
    fn test_collapse_braces() {
        assert_eq!(collapse_braces("{{x}}"), "x");
        assert_eq!(collapse_braces("{{{x}}}"), "x");
        assert_eq!(collapse_braces(r"\frac{{a}}{b}"), r"\frac{a}{b}");
        assert_eq!(collapse_braces(r"\frac{\sqrt{x}}{y}"), r"\frac{\sqrt{x}}{y}");
        assert_eq!(collapse_braces("{a}{b}"), "{a}{b}");
        assert_eq!(collapse_braces(r"\{\{x\}\}"), r"\{\{x\}\}");
    }

    #[test]
    fn test_balance_left_right() {
        assert_eq!(balance_left_right(r"\left( x"), r"\left( x\right.");
        assert_eq!(balance_left_right(r"x \right)"), r"\left.x \right)");
        assert_eq!(balance_left_right(r"\leftarrow x"), r"\leftarrow x");
        assert_eq!(
            balance_left_right(r"\left\{ a \right\}"),
            r"\left\{ a \right\}"
        );
    }

    #[test]
    fn test_array_to_matrix() {
        assert_eq!(
            array_to_matrix(r"\begin{array}{cc}a&b\end{array}"),
            r"\begin{matrix}a&b\end{matrix}"
        );
        assert_eq!(
            array_to_matrix(r"\begin{array} {l|r}1\end{array}"),
            r"\begin{matrix}1\end{matrix}"
        );
    }

    #[test]
    fn test_unwrap_overlaps() {
        assert_eq!(unwrap_overlaps(r"\rlap{x}y"), "xy");
        assert_eq!(unwrap_overlaps(r"\llap {\alpha}"), r"\alpha");
        assert_eq!(unwrap_overlaps(r"\rlap x"), r"\rlap x");
    }

    #[test]
    fn test_normalize_quads() {
        assert_eq!(normalize_quads(r"a\quad\quad\qquad b"), r"a\; b");
        assert_eq!(normalize_quads(r"a\quad b"), r"a\; b");
        assert_eq!(normalize_quads(r"a\qquad b"), r"a\; b");
    }

    #[test]
    fn test_despace_pattern() {
        let re = despace_pattern("ln").unwrap();
        assert_eq!(re.replace_all("l n x", "ln"), "ln x");
        assert_eq!(re.replace_all("al n", "ln"), "al n");
        assert!(despace_pattern("x").is_none());
    }

    #[test]
    fn test_strip_trailing_spacing() {
        assert_eq!(strip_trailing_spacing(r"x\,\;"), "x");
        assert_eq!(strip_trailing_spacing(r"x \, \_"), "x ");
        assert_eq!(strip_trailing_spacing(r"a\,b"), r"a\,b");
    }

    #[test]
    fn test_unescape_underscore() {
        assert_eq!(unescape_underscore(r"x\_1"), "x_1");
        assert_eq!(unescape_underscore(r"a\\_b"), r"a\\_b");
    }

    #[test]
    fn test_remove_empty_braces() {
        assert_eq!(remove_empty_braces("x{}y"), "xy");
        assert_eq!(remove_empty_braces(r"\alpha{}b"), r"\alpha{}b");
        assert_eq!(remove_empty_braces(r"\frac{}{b}"), r"\frac{}{b}");
        assert_eq!(remove_empty_braces(r"x^{}"), r"x^{}");
        assert_eq!(remove_empty_braces(r"{a}{}"), r"{a}{}");
        assert_eq!(remove_empty_braces("{}x"), "x");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }

    #[test]
    fn test_garbage_threshold() {
        let config = RepairConfig::default();
        assert!(is_garbage(&"\\,".repeat(25), &config));
        assert!(!is_garbage(&"\\,".repeat(20), &config));
        let diluted = format!("{}{}", "\\,".repeat(25), "x".repeat(100));
        assert!(!is_garbage(&diluted, &config));
    }
}
