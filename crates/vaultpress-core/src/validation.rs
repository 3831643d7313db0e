//! Build-time content validation.
//!
//! Validation never blocks rendering: unresolved wikilinks and incomplete
//! frontmatter are reported as issues the caller can print as build warnings.

use crate::models::{Collection, Document, LinkMatch};
use serde::{Deserialize, Serialize};

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message (not a problem)
    Info,
    /// Should be addressed, the page still renders
    Warning,
    /// Should be fixed
    Error,
}

impl Severity {
    /// Check if this severity is considered a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A validation issue found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Category of the issue (`wikilink`, `frontmatter`)
    pub category: String,
    /// Document the issue was found in
    pub document: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        document: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            document: document.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Set a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Collected issues for one or more documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue to the report
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    /// Get issues by severity
    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Whether any issue is a failure
    pub fn has_failures(&self) -> bool {
        self.issues.iter().any(|i| i.severity.is_failure())
    }

    /// Total issue count
    pub fn total_issues(&self) -> usize {
        self.issues.len()
    }

    /// Emit every issue through the `log` facade
    pub fn log(&self) {
        for issue in &self.issues {
            match issue.severity {
                Severity::Info => log::info!("{}: {}", issue.document, issue.message),
                Severity::Warning => log::warn!("{}: {}", issue.document, issue.message),
                Severity::Error => log::error!("{}: {}", issue.document, issue.message),
            }
        }
    }
}

/// Wikilinks of one document split by whether their target exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkValidation {
    pub valid: Vec<LinkMatch>,
    pub invalid: Vec<LinkMatch>,
}

impl LinkValidation {
    /// One warning per unresolved wikilink
    pub fn to_report(&self, document: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        for link in &self.invalid {
            report.add_issue(
                ValidationIssue::new(
                    Severity::Warning,
                    "wikilink",
                    document,
                    format!("Unresolved wikilink [[{}]]", link.link),
                )
                .with_suggestion(format!("Create a post with slug '{}'", link.slug)),
            );
        }
        report
    }
}

/// Checks the frontmatter fields publishing relies on
#[derive(Debug, Clone, Default)]
pub struct FrontmatterValidator;

impl FrontmatterValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate one document
    pub fn validate(&self, doc: &Document) -> ValidationReport {
        let mut report = ValidationReport::new();
        let id = format!("{}/{}", doc.collection, doc.id);

        if doc.frontmatter.title.trim().is_empty() {
            report.add_issue(
                ValidationIssue::new(Severity::Error, "frontmatter", &id, "Missing title")
                    .with_suggestion("Add 'title:' to frontmatter"),
            );
        }

        match &doc.frontmatter.date {
            None if doc.collection == Collection::Posts => {
                report.add_issue(
                    ValidationIssue::new(Severity::Error, "frontmatter", &id, "Post has no date")
                        .with_suggestion("Add 'date: YYYY-MM-DD' to frontmatter"),
                );
            }
            Some(raw) if doc.frontmatter.published().is_none() => {
                report.add_issue(ValidationIssue::new(
                    Severity::Warning,
                    "frontmatter",
                    &id,
                    format!("Unparseable date: {}", raw),
                ));
            }
            _ => {}
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frontmatter;

    #[test]
    fn test_link_validation_report() {
        let validation = LinkValidation {
            valid: vec![LinkMatch::new("a", "a", "a")],
            invalid: vec![LinkMatch::new("Missing Note", "Missing Note", "missing-note")],
        };
        let report = validation.to_report("posts/a");
        assert_eq!(report.total_issues(), 1);
        assert!(!report.has_failures());
        assert!(report.issues[0].message.contains("[[Missing Note]]"));
    }

    #[test]
    fn test_frontmatter_validator() {
        let validator = FrontmatterValidator::new();

        let ok = Document::new(Collection::Posts, "ok", "")
            .with_frontmatter(Frontmatter::titled("Ok").with_date("2024-01-01"));
        assert_eq!(validator.validate(&ok).total_issues(), 0);

        let undated = Document::new(Collection::Posts, "undated", "")
            .with_frontmatter(Frontmatter::titled("Undated"));
        assert!(validator.validate(&undated).has_failures());

        let bad_date = Document::new(Collection::Pages, "about", "")
            .with_frontmatter(Frontmatter::titled("About").with_date("someday"));
        let report = validator.validate(&bad_date);
        assert_eq!(report.issues_by_severity(Severity::Warning).len(), 1);
    }
}
