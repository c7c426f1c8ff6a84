use crate::error::{PlayplanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One validated test plan file. Read-only once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Plan {
    pub suite_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub source: Source,
    pub tests: Vec<Test>,
}

impl Plan {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Provenance of a plan: the repository and repo-relative path it was
/// authored from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub repo: String,
    pub path: String,
}

impl Source {
    /// The descriptive path embedded into generated suites.
    pub fn describe(&self) -> String {
        format!("{}/{}", self.repo, self.path)
    }
}

// ---------------------------------------------------------------------------
// Test
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Test {
    pub name: String,
    pub start_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub steps: Vec<Step>,
}

impl Test {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// StepAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepAction {
    Click,
    Fill,
    Select,
    Goto,
    ExpectUrl,
    ExpectVisible,
    ExpectNotVisible,
    ExpectText,
}

impl StepAction {
    pub fn all() -> &'static [StepAction] {
        &[
            StepAction::Click,
            StepAction::Fill,
            StepAction::Select,
            StepAction::Goto,
            StepAction::ExpectUrl,
            StepAction::ExpectVisible,
            StepAction::ExpectNotVisible,
            StepAction::ExpectText,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepAction::Click => "click",
            StepAction::Fill => "fill",
            StepAction::Select => "select",
            StepAction::Goto => "goto",
            StepAction::ExpectUrl => "expectUrl",
            StepAction::ExpectVisible => "expectVisible",
            StepAction::ExpectNotVisible => "expectNotVisible",
            StepAction::ExpectText => "expectText",
        }
    }

    pub fn takes_target(self) -> bool {
        !matches!(self, StepAction::Goto | StepAction::ExpectUrl)
    }

    pub fn takes_value(self) -> bool {
        matches!(
            self,
            StepAction::Fill
                | StepAction::Select
                | StepAction::Goto
                | StepAction::ExpectUrl
                | StepAction::ExpectText
        )
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepAction {
    type Err = PlayplanError;

    fn from_str(s: &str) -> Result<Self> {
        StepAction::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| PlayplanError::UnsupportedStep(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One interaction or assertion. The JSON form is a flat object
/// discriminated by `action`; see [`RawStep`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStep", into = "RawStep")]
pub enum Step {
    Click { target: String },
    Fill { target: String, value: String },
    Select { target: String, value: String },
    Goto { value: String },
    ExpectUrl { value: String },
    ExpectVisible { target: String },
    ExpectNotVisible { target: String },
    ExpectText { target: String, value: String },
}

impl Step {
    pub fn action(&self) -> StepAction {
        match self {
            Step::Click { .. } => StepAction::Click,
            Step::Fill { .. } => StepAction::Fill,
            Step::Select { .. } => StepAction::Select,
            Step::Goto { .. } => StepAction::Goto,
            Step::ExpectUrl { .. } => StepAction::ExpectUrl,
            Step::ExpectVisible { .. } => StepAction::ExpectVisible,
            Step::ExpectNotVisible { .. } => StepAction::ExpectNotVisible,
            Step::ExpectText { .. } => StepAction::ExpectText,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Step::Click { target }
            | Step::Fill { target, .. }
            | Step::Select { target, .. }
            | Step::ExpectVisible { target }
            | Step::ExpectNotVisible { target }
            | Step::ExpectText { target, .. } => Some(target),
            Step::Goto { .. } | Step::ExpectUrl { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Step::Fill { value, .. }
            | Step::Select { value, .. }
            | Step::Goto { value }
            | Step::ExpectUrl { value }
            | Step::ExpectText { value, .. } => Some(value),
            Step::Click { .. } | Step::ExpectVisible { .. } | Step::ExpectNotVisible { .. } => None,
        }
    }
}

/// Wire shape of a step before its action is checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStep {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl TryFrom<RawStep> for Step {
    type Error = PlayplanError;

    fn try_from(raw: RawStep) -> Result<Self> {
        let action: StepAction = raw.action.parse()?;

        let reject = |field: &str| PlayplanError::InvalidStep {
            action: action.to_string(),
            reason: format!("unexpected field '{field}'"),
        };
        if raw.target.is_some() && !action.takes_target() {
            return Err(reject("target"));
        }
        if raw.value.is_some() && !action.takes_value() {
            return Err(reject("value"));
        }

        let require = |field: &str, v: Option<String>| {
            v.ok_or_else(|| PlayplanError::InvalidStep {
                action: action.to_string(),
                reason: format!("missing required field '{field}'"),
            })
        };

        let step = match action {
            StepAction::Click => Step::Click {
                target: require("target", raw.target)?,
            },
            StepAction::Fill => Step::Fill {
                target: require("target", raw.target)?,
                value: require("value", raw.value)?,
            },
            StepAction::Select => Step::Select {
                target: require("target", raw.target)?,
                value: require("value", raw.value)?,
            },
            StepAction::Goto => Step::Goto {
                value: require("value", raw.value)?,
            },
            StepAction::ExpectUrl => Step::ExpectUrl {
                value: require("value", raw.value)?,
            },
            StepAction::ExpectVisible => Step::ExpectVisible {
                target: require("target", raw.target)?,
            },
            StepAction::ExpectNotVisible => Step::ExpectNotVisible {
                target: require("target", raw.target)?,
            },
            StepAction::ExpectText => Step::ExpectText {
                target: require("target", raw.target)?,
                value: require("value", raw.value)?,
            },
        };
        Ok(step)
    }
}

impl From<Step> for RawStep {
    fn from(step: Step) -> Self {
        RawStep {
            action: step.action().as_str().to_string(),
            target: step.target().map(str::to_string),
            value: step.value().map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step_action_str_roundtrip() {
        for &action in StepAction::all() {
            let parsed: StepAction = action.as_str().parse().unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn unknown_action_is_unsupported() {
        let err = "nope".parse::<StepAction>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unsupported step"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn step_deserializes_by_action() {
        let step: Step =
            serde_json::from_value(json!({"action": "fill", "target": "login.email", "value": "a@b.c"}))
                .unwrap();
        assert_eq!(
            step,
            Step::Fill {
                target: "login.email".to_string(),
                value: "a@b.c".to_string(),
            }
        );
        assert_eq!(step.action(), StepAction::Fill);
        assert_eq!(step.target(), Some("login.email"));
    }

    #[test]
    fn goto_rejects_target() {
        let err = serde_json::from_value::<Step>(json!({"action": "goto", "value": "/", "target": "x"}))
            .unwrap_err();
        assert!(err.to_string().contains("unexpected field 'target'"));
    }

    #[test]
    fn click_requires_target() {
        let err = serde_json::from_value::<Step>(json!({"action": "click"})).unwrap_err();
        assert!(err.to_string().contains("missing required field 'target'"));
    }

    #[test]
    fn step_rejects_unknown_fields() {
        let err = serde_json::from_value::<Step>(
            json!({"action": "click", "target": "a", "timeout": 10}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn plan_rejects_unknown_fields() {
        let err = serde_json::from_value::<Plan>(json!({
            "suiteName": "S",
            "source": {"repo": "r", "path": "p"},
            "tests": [],
            "extra": true
        }))
        .unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn step_serializes_flat() {
        let step = Step::ExpectUrl {
            value: "/settings".to_string(),
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value, json!({"action": "expectUrl", "value": "/settings"}));
    }

    #[test]
    fn source_describe_joins_repo_and_path() {
        let source = Source {
            repo: "web".to_string(),
            path: "docs/ac/login.md".to_string(),
        };
        assert_eq!(source.describe(), "web/docs/ac/login.md");
    }
}
