//! Predicates for vanity addresses.
//!
//! Candidates are tested in their checksummed form, `0x` prefix included,
//! so every comparison is case-sensitive.

#![forbid(unsafe_code)]

use eth_vanity_core::{Error, Result};
use regex::Regex;

/// Prefix/suffix/regular-expression rule for checksummed addresses.
///
/// A regex, when present, is the only thing evaluated. Otherwise every
/// present prefix and suffix must hold. No rule at all matches everything.
#[derive(Clone, Debug, Default)]
pub struct MatchPredicate {
    prefix: Option<String>,
    suffix: Option<String>,
    pattern: Option<Regex>,
}

impl MatchPredicate {
    /// Build a predicate. Empty strings count as absent.
    ///
    /// A pattern that fails to compile is `InvalidPredicate`.
    pub fn new(prefix: Option<&str>, suffix: Option<&str>, pattern: Option<&str>) -> Result<Self> {
        let pattern = match non_empty(pattern) {
            Some(pattern) => Some(
                Regex::new(pattern)
                    .map_err(|e| Error::InvalidPredicate(format!("'{}': {}", pattern, e)))?,
            ),
            None => None,
        };

        Ok(Self {
            prefix: non_empty(prefix).map(str::to_string),
            suffix: non_empty(suffix).map(str::to_string),
            pattern,
        })
    }

    /// Matches everything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: Some(prefix).filter(|p| !p.is_empty()),
            ..Self::default()
        }
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        let suffix: String = suffix.into();
        Self {
            suffix: Some(suffix).filter(|s| !s.is_empty()),
            ..Self::default()
        }
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Self::new(None, None, Some(pattern))
    }

    /// Check a checksummed address.
    pub fn matches(&self, address: &str) -> bool {
        if let Some(pattern) = &self.pattern {
            return pattern.is_match(address);
        }

        self.prefix.as_deref().map_or(true, |p| address.starts_with(p))
            && self.suffix.as_deref().map_or(true, |s| address.ends_with(s))
    }

    pub fn prefix_str(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn suffix_str(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn pattern_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// True if no rule is set.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.suffix.is_none() && self.pattern.is_none()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Expected attempts until a random address satisfies `predicate`.
///
/// Each fixed hex letter costs a factor of 32 (digit and case), each
/// decimal digit 16. `None` for regex predicates, which cannot be
/// estimated, and for prefixes or suffixes no address can satisfy.
pub fn estimate_difficulty(predicate: &MatchPredicate) -> Option<f64> {
    if predicate.pattern.is_some() {
        return None;
    }

    let mut expected = 1.0;

    if let Some(prefix) = predicate.prefix_str() {
        let digits = if let Some(rest) = prefix.strip_prefix("0x") {
            rest
        } else if "0x".starts_with(prefix) {
            ""
        } else {
            return None;
        };
        expected *= positions_cost(digits)?;
    }

    if let Some(suffix) = predicate.suffix_str() {
        expected *= positions_cost(suffix_digits(suffix)?)?;
    }

    Some(expected)
}

/// Hex digits of a suffix. A suffix longer than 40 characters reaches
/// into the `0x` prefix, which must then match literally.
fn suffix_digits(suffix: &str) -> Option<&str> {
    let extra = suffix.len().saturating_sub(40);
    if extra == 0 {
        return Some(suffix);
    }
    if !suffix.is_char_boundary(extra) || !"0x".ends_with(&suffix[..extra]) {
        return None;
    }
    Some(&suffix[extra..])
}

fn positions_cost(digits: &str) -> Option<f64> {
    if digits.len() > 40 {
        return None;
    }
    digits.chars().try_fold(1.0, |acc, c| match c {
        '0'..='9' => Some(acc * 16.0),
        'a'..='f' | 'A'..='F' => Some(acc * 32.0),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x114A781017506df34B3Ed4C0E6B438889a6Eb3F7";

    #[test]
    fn test_prefix_match() {
        assert!(MatchPredicate::prefix("0x114A").matches(ADDRESS));
        assert!(!MatchPredicate::prefix("0x114a").matches(ADDRESS));
        assert!(!MatchPredicate::prefix("114A").matches(ADDRESS));
    }

    #[test]
    fn test_suffix_match() {
        assert!(MatchPredicate::suffix("b3F7").matches(ADDRESS));
        assert!(!MatchPredicate::suffix("B3F7").matches(ADDRESS));
    }

    #[test]
    fn test_prefix_and_suffix_both_required() {
        let both = MatchPredicate::new(Some("0x114A"), Some("b3F7"), None).unwrap();
        assert!(both.matches(ADDRESS));

        let wrong_suffix = MatchPredicate::new(Some("0x114A"), Some("ffff"), None).unwrap();
        assert!(!wrong_suffix.matches(ADDRESS));
    }

    #[test]
    fn test_regex_overrides_prefix_and_suffix() {
        let predicate = MatchPredicate::new(Some("0xdead"), Some("beef"), Some("^0x114A")).unwrap();
        assert!(predicate.matches(ADDRESS));

        let predicate = MatchPredicate::new(Some("0x114A"), None, Some("^0xdead")).unwrap();
        assert!(!predicate.matches(ADDRESS));
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        assert!(MatchPredicate::any().matches(ADDRESS));
        assert!(MatchPredicate::any().matches(""));

        let blank = MatchPredicate::new(Some(""), Some(""), Some("")).unwrap();
        assert!(blank.is_empty());
        assert!(blank.matches(ADDRESS));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(
            MatchPredicate::regex("0x(abc"),
            Err(Error::InvalidPredicate(_))
        ));
        assert!(matches!(
            MatchPredicate::new(Some("0x1"), None, Some("[")),
            Err(Error::InvalidPredicate(_))
        ));
    }

    #[test]
    fn test_accessors() {
        let predicate = MatchPredicate::new(Some("0xAb"), Some("cd"), None).unwrap();
        assert_eq!(predicate.prefix_str(), Some("0xAb"));
        assert_eq!(predicate.suffix_str(), Some("cd"));
        assert_eq!(predicate.pattern_str(), None);
        assert_eq!(MatchPredicate::regex("^0x0").unwrap().pattern_str(), Some("^0x0"));
    }

    #[test]
    fn test_estimate_difficulty() {
        assert_eq!(estimate_difficulty(&MatchPredicate::any()), Some(1.0));
        assert_eq!(estimate_difficulty(&MatchPredicate::prefix("0x")), Some(1.0));
        assert_eq!(estimate_difficulty(&MatchPredicate::prefix("0x0")), Some(16.0));
        assert_eq!(estimate_difficulty(&MatchPredicate::prefix("0xA")), Some(32.0));
        assert_eq!(estimate_difficulty(&MatchPredicate::suffix("a1")), Some(512.0));
        assert_eq!(
            estimate_difficulty(&MatchPredicate::new(Some("0x0"), Some("0"), None).unwrap()),
            Some(256.0)
        );
    }

    #[test]
    fn test_estimate_difficulty_full_length_suffix() {
        let whole = &ADDRESS[..];
        assert!(MatchPredicate::suffix(whole).matches(ADDRESS));
        // 13 letters, 27 digits
        let expected = 32f64.powi(13) * 16f64.powi(27);
        assert_eq!(estimate_difficulty(&MatchPredicate::suffix(whole)), Some(expected));
        assert_eq!(
            estimate_difficulty(&MatchPredicate::suffix(&ADDRESS[1..])),
            Some(expected)
        );
        assert_eq!(
            estimate_difficulty(&MatchPredicate::suffix(format!("y{}", &ADDRESS[2..]))),
            None
        );
        assert_eq!(
            estimate_difficulty(&MatchPredicate::suffix(format!("00{}", &ADDRESS[2..]))),
            None
        );
    }

    #[test]
    fn test_estimate_difficulty_unsatisfiable_or_unknown() {
        assert_eq!(estimate_difficulty(&MatchPredicate::regex("^0x00").unwrap()), None);
        assert_eq!(estimate_difficulty(&MatchPredicate::prefix("114A")), None);
        assert_eq!(estimate_difficulty(&MatchPredicate::prefix("0xg")), None);
        assert_eq!(estimate_difficulty(&MatchPredicate::suffix("xyz")), None);
    }
}
