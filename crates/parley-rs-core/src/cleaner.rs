//! Literal substitutions applied to generated replies.

/// One literal `pattern -> replacement` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

impl Substitution {
    pub const fn new(pattern: &'static str, replacement: &'static str) -> Self {
        Self {
            pattern,
            replacement,
        }
    }
}

/// Default cleanup table, applied top to bottom.
///
/// No replacement contains `*`, `[` or a persona name, so a second pass
/// never matches anything the first pass produced.
pub const DEFAULT_SUBSTITUTIONS: &[Substitution] = &[
    // markdown emphasis
    Substitution::new("**", ""),
    Substitution::new("*", ""),
    // persona and sender placeholders
    Substitution::new("Priyansh Arora", "the partnerships team"),
    Substitution::new("[Your Name]", "The Partnerships Team"),
    Substitution::new("[Your Company]", "our brand"),
    Substitution::new("[Brand Name]", "our brand"),
    // contact placeholders
    Substitution::new("[Your Email]", "partnerships@example.com"),
    Substitution::new("[Your Phone Number]", "+91 00000 00000"),
    Substitution::new("[Your Phone]", "+91 00000 00000"),
];

/// Applies an ordered substitution table to model output.
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    rules: Vec<Substitution>,
}

impl Default for ResponseCleaner {
    fn default() -> Self {
        Self::with_rules(DEFAULT_SUBSTITUTIONS.to_vec())
    }
}

impl ResponseCleaner {
    /// Create a cleaner with a custom table.
    pub fn with_rules(rules: Vec<Substitution>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Substitution] {
        &self.rules
    }

    /// Apply every rule in order and return the cleaned text.
    pub fn clean(&self, text: &str) -> String {
        self.rules
            .iter()
            .filter(|rule| !rule.pattern.is_empty())
            .fold(text.to_string(), |acc, rule| {
                if acc.contains(rule.pattern) {
                    acc.replace(rule.pattern, rule.replacement)
                } else {
                    acc
                }
            })
    }
}
