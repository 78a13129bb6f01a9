//! Name filtering for `*_list` data sources
//!
//! Every filter keeps the order of its input. [`NameFilter::apply`] runs the
//! supplied criteria one after another, each on the output of the previous.

use regex::Regex;
use tfplug::types::{AttributePath, DynamicValue};

use crate::error::{Error, Result};

pub const STARTS_WITH: &str = "starts_with";
pub const ENDS_WITH: &str = "ends_with";
pub const CONTAINS: &str = "contains";
pub const REGEX_MATCH: &str = "regex_match";

pub fn filter_starts_with(names: &[String], prefix: &str) -> Vec<String> {
    names
        .iter()
        .filter(|name| name.starts_with(prefix))
        .cloned()
        .collect()
}

pub fn filter_ends_with(names: &[String], suffix: &str) -> Vec<String> {
    names
        .iter()
        .filter(|name| name.ends_with(suffix))
        .cloned()
        .collect()
}

pub fn filter_contains(names: &[String], substring: &str) -> Vec<String> {
    names
        .iter()
        .filter(|name| name.contains(substring))
        .cloned()
        .collect()
}

/// Names matched in their entirety by `pattern`
///
/// Fails when the pattern does not compile, even for an empty input.
pub fn filter_matches_regex(names: &[String], pattern: &str) -> Result<Vec<String>> {
    let invalid = |source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    };

    Regex::new(pattern).map_err(invalid)?;
    // A trailing `#` comment under the x flag swallows the closing group
    // unless a newline ends it first.
    let anchored = Regex::new(&format!("^(?:{})$", pattern))
        .or_else(|_| Regex::new(&format!("^(?:{}\n)$", pattern)))
        .map_err(invalid)?;

    Ok(names
        .iter()
        .filter(|name| anchored.is_match(name))
        .cloned()
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameFilter {
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub contains: Option<String>,
    pub regex_match: Option<String>,
}

impl NameFilter {
    /// Read the filter options from a data source configuration. Null,
    /// unknown and empty strings count as not supplied.
    pub fn from_config(config: &DynamicValue) -> Self {
        let option = |name: &str| {
            config
                .get(&AttributePath::new(name))
                .and_then(|value| value.as_str())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            starts_with: option(STARTS_WITH),
            ends_with: option(ENDS_WITH),
            contains: option(CONTAINS),
            regex_match: option(REGEX_MATCH),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.starts_with.is_none()
            && self.ends_with.is_none()
            && self.contains.is_none()
            && self.regex_match.is_none()
    }

    /// starts_with, then ends_with, then contains, then regex_match
    pub fn apply(&self, mut names: Vec<String>) -> Result<Vec<String>> {
        if let Some(prefix) = &self.starts_with {
            names = filter_starts_with(&names, prefix);
        }
        if let Some(suffix) = &self.ends_with {
            names = filter_ends_with(&names, suffix);
        }
        if let Some(substring) = &self.contains {
            names = filter_contains(&names, substring);
        }
        if let Some(pattern) = &self.regex_match {
            names = filter_matches_regex(&names, pattern)?;
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tfplug::types::Dynamic;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn literal_filters_keep_order() {
        let list = names(&["web-b", "api", "web-a", "db-web"]);
        assert_eq!(filter_starts_with(&list, "web"), ["web-b", "web-a"]);
        assert_eq!(filter_ends_with(&list, "-a"), ["web-a"]);
        assert_eq!(filter_contains(&list, "web"), ["web-b", "web-a", "db-web"]);
    }

    #[test]
    fn literal_filters_are_case_sensitive() {
        let list = names(&["Web", "web"]);
        assert_eq!(filter_starts_with(&list, "web"), ["web"]);
        assert_eq!(filter_contains(&list, "W"), ["Web"]);
    }

    #[test]
    fn starts_with_and_contains_narrow_sequentially() {
        let filter = NameFilter {
            starts_with: Some("a".into()),
            contains: Some("ph".into()),
            ..Default::default()
        };
        let result = filter.apply(names(&["alpha", "beta", "alphabet"])).unwrap();
        assert_eq!(result, ["alpha", "alphabet"]);
    }

    #[test]
    fn regex_must_match_whole_name() {
        let list = names(&["x1", "x2", "y1"]);
        assert_eq!(filter_matches_regex(&list, "^x[0-9]$").unwrap(), ["x1", "x2"]);
        assert_eq!(filter_matches_regex(&list, "x[0-9]").unwrap(), ["x1", "x2"]);
        assert!(filter_matches_regex(&names(&["ax1"]), "x[0-9]")
            .unwrap()
            .is_empty());
        // alternation stays inside the anchors
        assert_eq!(
            filter_matches_regex(&names(&["x1", "zy1"]), "x1|y1").unwrap(),
            ["x1"]
        );
    }

    #[test]
    fn verbose_pattern_with_trailing_comment() {
        let list = names(&["x1", "y1", "x12"]);
        assert_eq!(
            filter_matches_regex(&list, "(?x) x [0-9] # digit suffix").unwrap(),
            ["x1"]
        );
        assert_eq!(
            filter_matches_regex(&list, "(?x) x [0-9]+ # digits\n").unwrap(),
            ["x1", "x12"]
        );
        // without the x flag the newline stays out of the pattern
        assert!(filter_matches_regex(&names(&["x1\n"]), "x1").unwrap().is_empty());
    }

    #[test]
    fn no_criteria_returns_input_unchanged() {
        let list = names(&["b", "a", "c"]);
        let filter = NameFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(list.clone()).unwrap(), list);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let filter = NameFilter {
            ends_with: Some("z".into()),
            ..Default::default()
        };
        assert!(filter.apply(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn invalid_regex_fails_the_whole_listing() {
        let filter = NameFilter {
            starts_with: Some("x".into()),
            regex_match: Some("(".into()),
            ..Default::default()
        };
        let err = filter.apply(names(&["x1", "x2"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPattern);
        assert!(err.to_string().contains("'('"));

        // also when earlier filters left nothing to match
        let err = filter.apply(names(&["y1"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPattern);
    }

    #[test]
    fn from_config_ignores_empty_and_null_options() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new(STARTS_WITH), "web")
            .unwrap();
        config.set_string(&AttributePath::new(CONTAINS), "").unwrap();
        config
            .set(&AttributePath::new(ENDS_WITH), Dynamic::Null)
            .unwrap();

        let filter = NameFilter::from_config(&config);
        assert_eq!(
            filter,
            NameFilter {
                starts_with: Some("web".into()),
                ..Default::default()
            }
        );
    }
}
