//! Attribute validators
//!
//! Validators run while Terraform validates configuration. They only see
//! known values: null and unknown values are skipped by the caller.

use crate::types::{AttributePath, Diagnostic, Dynamic};

pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

/// Bounds the length of a string; `min: Some(1)` rejects empty strings
pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn non_empty() -> Self {
        Self {
            min: Some(1),
            max: None,
        }
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("string length between {} and {}", min, max),
            (Some(min), None) => format!("string length at least {}", min),
            (None, Some(max)) => format!("string length at most {}", max),
            (None, None) => "any string".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(s) = value.as_str() else {
            return;
        };
        let len = s.chars().count();
        if let Some(min) = self.min {
            if len < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have minimum length of {}", path, min),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if len > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have maximum length of {}", path, max),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Accepts only one of a fixed set of strings
pub struct OneOfValidator {
    pub values: Vec<String>,
}

impl OneOfValidator {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("one of: {}", self.values.join(", "))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} has an invalid value", path),
                        format!("Expected {}, got '{}'", self.description(), s),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("number between {} and {}", min, max),
            (Some(min), None) => format!("number at least {}", min),
            (None, Some(max)) => format!("number at most {}", max),
            (None, None) => "any number".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(n) = value.as_number() else {
            return;
        };
        if let Some(min) = self.min {
            if n < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be at least {}", path, min),
                        format!("Got {}", n),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if n > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be at most {}", path, max),
                        format!("Got {}", n),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Requires the string to be a syntactically valid regular expression
pub struct RegexSyntaxValidator;

impl Validator for RegexSyntaxValidator {
    fn description(&self) -> String {
        "valid regular expression".to_string()
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(pattern) = value.as_str() {
            if let Err(e) = regex::Regex::new(pattern) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} is not a valid regular expression", path),
                        e.to_string(),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(validator: &dyn Validator, value: Dynamic) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        validator.validate(&value, &AttributePath::new("field"), &mut diags);
        diags
    }

    #[test]
    fn string_length_validator_rejects_empty_name() {
        let diags = run(&StringLengthValidator::non_empty(), Dynamic::String(String::new()));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("minimum length"));
        assert_eq!(diags[0].attribute, Some(AttributePath::new("field")));

        assert!(run(&StringLengthValidator::non_empty(), Dynamic::String("a".into())).is_empty());
    }

    #[test]
    fn string_length_validator_rejects_too_long() {
        let validator = StringLengthValidator {
            min: None,
            max: Some(5),
        };
        let diags = run(&validator, Dynamic::String("hello world".into()));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("maximum length"));
    }

    #[test]
    fn one_of_validator() {
        let validator = OneOfValidator::new(["round_robin", "least_connections"]);
        assert!(run(&validator, Dynamic::String("round_robin".into())).is_empty());

        let diags = run(&validator, Dynamic::String("random".into()));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].detail.contains("round_robin, least_connections"));
    }

    #[test]
    fn number_range_validator() {
        let validator = NumberRangeValidator {
            min: Some(1.0),
            max: Some(65535.0),
        };
        assert!(run(&validator, Dynamic::Number(443.0)).is_empty());
        assert_eq!(run(&validator, Dynamic::Number(0.0)).len(), 1);
        assert_eq!(run(&validator, Dynamic::Number(70000.0)).len(), 1);
    }

    #[test]
    fn regex_syntax_validator() {
        assert!(run(&RegexSyntaxValidator, Dynamic::String("^web-[0-9]+$".into())).is_empty());

        let diags = run(&RegexSyntaxValidator, Dynamic::String("(".into()));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("not a valid regular expression"));
    }

    #[test]
    fn validators_ignore_other_types() {
        assert!(run(&RegexSyntaxValidator, Dynamic::Number(1.0)).is_empty());
        assert!(run(&StringLengthValidator::non_empty(), Dynamic::Bool(false)).is_empty());
    }
}
