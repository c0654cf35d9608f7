// OCR LaTeX repair
//
// Normalizes the LaTeX produced by OCR engines before it reaches the
// parser: strips math-mode wrappers and display-only commands, fixes
// unbalanced `\left`/`\right`, rewrites `array` as `matrix` and discards
// output that is nothing but spacing escapes. Repair never fails.

mod config;
mod rules;

use once_cell::sync::Lazy;
use regex::Regex;

pub use config::{ConfigError, RepairConfig};
use rules::RULES;

static DEFAULT_REPAIRER: Lazy<Repairer> = Lazy::new(Repairer::default);

/// Repair raw OCR LaTeX with the default configuration.
///
/// Returns the empty string when the input is judged to be garbage.
///
/// ```
/// use formula_convert::formula::repair;
///
/// assert_eq!(repair(r"$$\displaystyle \frac{a}{b}$$"), r"\frac{a}{b}");
/// ```
pub fn repair(raw: &str) -> String {
    DEFAULT_REPAIRER.repair(raw)
}

/// Repair pass with a compiled [`RepairConfig`].
#[derive(Debug, Clone)]
pub struct Repairer {
    config: RepairConfig,
    despacers: Vec<(Regex, String)>,
}

impl Repairer {
    pub fn new(config: RepairConfig) -> Self {
        let despacers = config
            .despaced_words
            .iter()
            .filter_map(|word| rules::despace_pattern(word).map(|re| (re, word.clone())))
            .collect();
        Self { config, despacers }
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    pub fn repair(&self, raw: &str) -> String {
        if rules::is_garbage(raw, &self.config) {
            log::debug!("discarding {} bytes of spacing-escape garbage", raw.len());
            return String::new();
        }

        let mut current = raw.to_string();
        for rule in RULES {
            let next = (rule.apply)(&current, self);
            if next != current {
                log::trace!("repair rule {} rewrote {:?} -> {:?}", rule.name, current, next);
                current = next;
            }
        }
        current
    }

    fn despace(&self, input: &str) -> String {
        let mut current = input.to_string();
        for (pattern, word) in &self.despacers {
            if let std::borrow::Cow::Owned(replaced) = pattern.replace_all(&current, word.as_str()) {
                current = replaced;
            }
        }
        current
    }
}

impl Default for Repairer {
    fn default() -> Self {
        Self::new(RepairConfig::default())
    }
}
