// 📏 Validation Rules
// Declarative invariants for numeric and text fields

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// NUMBER RULES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumberRule {
    /// Not NaN or infinite
    Finite,
    /// Strictly greater than zero
    Positive,
    /// Zero or greater
    NonNegative,
    /// Inclusive bounds
    Range { min: f64, max: f64 },
    /// Inclusive upper bound
    Max(f64),
}

impl NumberRule {
    pub fn check(&self, value: f64) -> bool {
        match self {
            NumberRule::Finite => value.is_finite(),
            NumberRule::Positive => value > 0.0,
            NumberRule::NonNegative => value >= 0.0,
            NumberRule::Range { min, max } => value >= *min && value <= *max,
            NumberRule::Max(max) => value <= *max,
        }
    }

    pub fn description(&self) -> String {
        match self {
            NumberRule::Finite => "must be a finite number".to_string(),
            NumberRule::Positive => "must be greater than 0".to_string(),
            NumberRule::NonNegative => "must be 0 or greater".to_string(),
            NumberRule::Range { min, max } => format!("must be between {} and {}", min, max),
            NumberRule::Max(max) => format!("must be at most {}", max),
        }
    }
}

// ============================================================================
// TEXT RULES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextRule {
    /// At least one non-whitespace character
    NonEmpty,
    /// At most N characters
    MaxLength(usize),
    /// Regular expression that must match the whole value
    Pattern(String),
    /// ASCII digits only, length within bounds
    Digits { min: usize, max: usize },
}

impl TextRule {
    pub fn check(&self, value: &str) -> bool {
        self.compile().check(value)
    }

    /// Compile once for repeated checks
    pub fn compile(&self) -> CompiledTextRule {
        let regex = match self {
            TextRule::Pattern(pattern) => Regex::new(&format!("^(?:{})$", pattern)).ok(),
            _ => None,
        };
        CompiledTextRule {
            rule: self.clone(),
            regex,
        }
    }

    pub fn description(&self) -> String {
        match self {
            TextRule::NonEmpty => "must not be empty".to_string(),
            TextRule::MaxLength(max) => format!("must be at most {} characters", max),
            TextRule::Pattern(pattern) => format!("must match {}", pattern),
            TextRule::Digits { min, max } => format!("must be {}-{} digits", min, max),
        }
    }
}

/// A text rule with its pattern (if any) compiled and anchored
#[derive(Debug, Clone)]
pub struct CompiledTextRule {
    rule: TextRule,
    regex: Option<Regex>,
}

impl CompiledTextRule {
    pub fn check(&self, value: &str) -> bool {
        match &self.rule {
            TextRule::NonEmpty => !value.trim().is_empty(),
            TextRule::MaxLength(max) => value.chars().count() <= *max,
            // Invalid patterns reject every value
            TextRule::Pattern(_) => self
                .regex
                .as_ref()
                .map(|re| re.is_match(value))
                .unwrap_or(false),
            TextRule::Digits { min, max } => {
                let len = value.len();
                len >= *min && len <= *max && value.chars().all(|c| c.is_ascii_digit())
            }
        }
    }

    pub fn rule(&self) -> &TextRule {
        &self.rule
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_rules() {
        assert!(NumberRule::Positive.check(0.01));
        assert!(!NumberRule::Positive.check(0.0));
        assert!(NumberRule::NonNegative.check(0.0));
        assert!(!NumberRule::NonNegative.check(-1.0));
        assert!(!NumberRule::Finite.check(f64::NAN));
        assert!(!NumberRule::Finite.check(f64::INFINITY));
        assert!(NumberRule::Range { min: 0.0, max: 1.0 }.check(1.0));
        assert!(!NumberRule::Range { min: 0.0, max: 1.0 }.check(1.5));
        assert!(NumberRule::Max(744.0).check(744.0));
        assert!(!NumberRule::Max(744.0).check(744.5));
    }

    #[test]
    fn test_text_rules() {
        assert!(TextRule::NonEmpty.check("Ada"));
        assert!(!TextRule::NonEmpty.check("   "));
        assert!(TextRule::MaxLength(3).check("abc"));
        assert!(!TextRule::MaxLength(3).check("abcd"));
        assert!(TextRule::Pattern("^[A-Z]{3}$".to_string()).check("USD"));
        assert!(!TextRule::Pattern("^[A-Z]{3}$".to_string()).check("usd"));
        assert!(TextRule::Digits { min: 12, max: 19 }.check("4111111111111111"));
        assert!(!TextRule::Digits { min: 12, max: 19 }.check("4111-1111-1111"));
        assert!(!TextRule::Digits { min: 12, max: 19 }.check("4111"));
    }

    #[test]
    fn test_invalid_pattern_rejects() {
        let rule = TextRule::Pattern("([".to_string());
        assert!(!rule.check("anything"));
    }

    #[test]
    fn test_pattern_must_match_whole_value() {
        let rule = TextRule::Pattern("[A-Z]{3}".to_string());
        assert!(rule.check("USD"));
        assert!(!rule.check("xxUSDxx"));
        assert!(!rule.check("USDX"));

        // Alternation stays inside the anchors
        let either = TextRule::Pattern("USD|EUR".to_string());
        assert!(either.check("EUR"));
        assert!(!either.check("USDEUR"));
    }

    #[test]
    fn test_compiled_rule_matches_uncompiled() {
        let rules = vec![
            TextRule::NonEmpty,
            TextRule::MaxLength(3),
            TextRule::Pattern("^[A-Z]{3}$".to_string()),
            TextRule::Digits { min: 2, max: 4 },
        ];
        for rule in &rules {
            let compiled = rule.compile();
            assert_eq!(compiled.rule(), rule);
            for value in ["", "USD", "usd", "123", "12345"] {
                assert_eq!(compiled.check(value), rule.check(value));
            }
        }
    }

    #[test]
    fn test_descriptions_are_readable() {
        assert_eq!(NumberRule::Positive.description(), "must be greater than 0");
        assert_eq!(
            TextRule::Digits { min: 12, max: 19 }.description(),
            "must be 12-19 digits"
        );
    }
}
