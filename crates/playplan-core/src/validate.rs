use crate::error::{PlayplanError, Result};
use crate::plan::{Plan, Test};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// ValidationIssue / ValidationReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field path, e.g. `tests[0].steps[2].target`.
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// One line per violated field.
    pub fn render(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("  - {}: {}", issue.path, issue.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate a parsed JSON document into a [`Plan`].
///
/// Structural problems (wrong types, unknown fields, unknown step actions)
/// stop at the first error serde reports. Semantic checks on the typed plan
/// are collected in full so every violated field is reported at once.
pub fn validate_plan(value: serde_json::Value) -> Result<Plan> {
    let plan: Plan = serde_json::from_value(value).map_err(|e| {
        let mut report = ValidationReport::default();
        report.push("plan", e.to_string());
        PlayplanError::InvalidPlan(report)
    })?;

    let report = check_plan(&plan);
    if report.is_empty() {
        Ok(plan)
    } else {
        Err(PlayplanError::InvalidPlan(report))
    }
}

pub fn check_plan(plan: &Plan) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.suite_name.trim().is_empty() {
        report.push("suiteName", "must not be empty");
    }
    if let Some(tags) = &plan.tags {
        check_tags(&mut report, "tags", tags);
    }

    if plan.source.repo.trim().is_empty() {
        report.push("source.repo", "must not be empty");
    }
    if plan.source.path.trim().is_empty() {
        report.push("source.path", "must not be empty");
    } else if is_absolute_like(&plan.source.path) {
        report.push(
            "source.path",
            format!(
                "must be repo-relative, got absolute path '{}'",
                plan.source.path
            ),
        );
    }

    if plan.tests.is_empty() {
        report.push("tests", "must contain at least one test");
    }
    for (i, test) in plan.tests.iter().enumerate() {
        check_test(&mut report, &format!("tests[{i}]"), test);
    }

    report
}

fn check_test(report: &mut ValidationReport, prefix: &str, test: &Test) {
    if test.name.trim().is_empty() {
        report.push(format!("{prefix}.name"), "must not be empty");
    }
    if test.start_url.trim().is_empty() {
        report.push(format!("{prefix}.startUrl"), "must not be empty");
    }
    if let Some(tags) = &test.tags {
        check_tags(report, &format!("{prefix}.tags"), tags);
    }
    if test.steps.is_empty() {
        report.push(format!("{prefix}.steps"), "must contain at least one step");
    }
    for (j, step) in test.steps.iter().enumerate() {
        if let Some(target) = step.target() {
            if target.trim().is_empty() {
                report.push(format!("{prefix}.steps[{j}].target"), "must not be empty");
            }
        }
    }
}

fn check_tags(report: &mut ValidationReport, path: &str, tags: &[String]) {
    if tags.is_empty() {
        report.push(path, "must not be empty when present");
        return;
    }
    let mut seen = HashSet::new();
    for (i, tag) in tags.iter().enumerate() {
        if !tag.starts_with('@') {
            report.push(format!("{path}[{i}]"), format!("tag '{tag}' must start with '@'"));
        }
        if !seen.insert(tag.as_str()) {
            report.push(format!("{path}[{i}]"), format!("duplicate tag '{tag}'"));
        }
    }
}

/// Unix roots and Windows drive/UNC prefixes both count as absolute.
fn is_absolute_like(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
