//! Reserved-key classification
//!
//! Operator keys (`and`, `or`, `xor`, `not`, `if`, `elif`, `else`) are
//! resolved to a [`KeyKind`] once per key, so the evaluator switches on an
//! enum instead of comparing strings. Promotion keys (`<<`, `<<|`, `<<-`,
//! each with an optional target suffix) parse to a [`PromotionKey`].

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::Mapping;

static PROMOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(<<[|-]?)(.*)$").expect("Invalid promotion pattern"));

/// What a mapping key means to the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// `and`
    And,
    /// `or`
    Or,
    /// `xor`
    Xor,
    /// `not`
    Not,
    /// `if`
    If,
    /// `elif`
    Elif,
    /// `else`
    Else,
    /// Any other key
    Plain,
}

impl KeyKind {
    /// Classify a mapping key
    pub fn classify(key: &str) -> Self {
        match key {
            "and" => KeyKind::And,
            "or" => KeyKind::Or,
            "xor" => KeyKind::Xor,
            "not" => KeyKind::Not,
            "if" => KeyKind::If,
            "elif" => KeyKind::Elif,
            "else" => KeyKind::Else,
            _ => KeyKind::Plain,
        }
    }

    /// First operator key of a mapping, in key order
    pub fn operator_of(mapping: &Mapping) -> Option<(KeyKind, &str)> {
        mapping.keys().find_map(|key| {
            let kind = KeyKind::classify(key);
            kind.is_operator().then_some((kind, key.as_str()))
        })
    }

    /// Whether this is one of the reserved operator keys
    pub fn is_operator(self) -> bool {
        self != KeyKind::Plain
    }

    /// Whether this is `if`, `elif` or `else`
    pub fn is_conditional(self) -> bool {
        matches!(self, KeyKind::If | KeyKind::Elif | KeyKind::Else)
    }

    /// The key text
    pub fn as_str(self) -> &'static str {
        match self {
            KeyKind::And => "and",
            KeyKind::Or => "or",
            KeyKind::Xor => "xor",
            KeyKind::Not => "not",
            KeyKind::If => "if",
            KeyKind::Elif => "elif",
            KeyKind::Else => "else",
            KeyKind::Plain => "plain",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How promoted keys combine with keys already in the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionMode {
    /// `<<`: promoted values replace existing ones
    Replace,
    /// `<<|`: deep merge, lists joined and flattened
    Merge,
    /// `<<-`: deep merge, lists joined, flattened and deduplicated
    MergeDedup,
}

impl PromotionMode {
    /// Whether colliding keys are deep merged
    pub fn merges(self) -> bool {
        self != PromotionMode::Replace
    }
}

/// A parsed promotion key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionKey<'a> {
    /// Modifier after `<<`
    pub mode: PromotionMode,
    /// Target key for non-mapping leftovers; may be empty
    pub suffix: &'a str,
}

impl<'a> PromotionKey<'a> {
    /// Parse `key`, returning `None` for ordinary keys
    pub fn parse(key: &'a str) -> Option<Self> {
        let captures = PROMOTE_RE.captures(key)?;
        let mode = match captures.get(1).map(|m| m.as_str()) {
            Some("<<|") => PromotionMode::Merge,
            Some("<<-") => PromotionMode::MergeDedup,
            _ => PromotionMode::Replace,
        };
        let suffix = captures.get(2).map_or("", |m| m.as_str());
        Some(Self { mode, suffix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("and", KeyKind::And)]
    #[case("or", KeyKind::Or)]
    #[case("xor", KeyKind::Xor)]
    #[case("not", KeyKind::Not)]
    #[case("if", KeyKind::If)]
    #[case("elif", KeyKind::Elif)]
    #[case("else", KeyKind::Else)]
    #[case("AND", KeyKind::Plain)]
    #[case("name", KeyKind::Plain)]
    #[case("<<", KeyKind::Plain)]
    fn test_classify(#[case] key: &str, #[case] expected: KeyKind) {
        assert_eq!(KeyKind::classify(key), expected);
    }

    #[test]
    fn test_conditional_kinds() {
        assert!(KeyKind::Elif.is_conditional());
        assert!(!KeyKind::Not.is_conditional());
        assert!(KeyKind::Not.is_operator());
        assert!(!KeyKind::Plain.is_operator());
    }

    #[test]
    fn test_operator_of_finds_first_operator() {
        let mut mapping = Mapping::new();
        mapping.insert("name".to_string(), true.into());
        mapping.insert("or".to_string(), true.into());
        mapping.insert("and".to_string(), true.into());
        assert_eq!(KeyKind::operator_of(&mapping), Some((KeyKind::Or, "or")));
    }

    #[rstest]
    #[case("<<", PromotionMode::Replace, "")]
    #[case("<<|", PromotionMode::Merge, "")]
    #[case("<<-", PromotionMode::MergeDedup, "")]
    #[case("<<packages", PromotionMode::Replace, "packages")]
    #[case("<<|packages", PromotionMode::Merge, "packages")]
    #[case("<<-packages", PromotionMode::MergeDedup, "packages")]
    #[case("<<||", PromotionMode::Merge, "|")]
    fn test_parse_promotion_key(
        #[case] key: &str,
        #[case] mode: PromotionMode,
        #[case] suffix: &str,
    ) {
        assert_eq!(PromotionKey::parse(key), Some(PromotionKey { mode, suffix }));
    }

    #[rstest]
    #[case("<")]
    #[case("a<<")]
    #[case(" <<")]
    #[case("")]
    fn test_ordinary_keys_are_not_promotions(#[case] key: &str) {
        assert_eq!(PromotionKey::parse(key), None);
    }

    #[test]
    fn test_merge_modes() {
        assert!(!PromotionMode::Replace.merges());
        assert!(PromotionMode::Merge.merges());
        assert!(PromotionMode::MergeDedup.merges());
    }
}
