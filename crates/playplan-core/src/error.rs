use crate::validate::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayplanError {
    #[error("Unsupported step action: {0}")]
    UnsupportedStep(String),

    #[error("invalid '{action}' step: {reason}")]
    InvalidStep { action: String, reason: String },

    #[error("plan failed validation:\n{0}")]
    InvalidPlan(ValidationReport),

    #[error("suite name '{0}' produces an empty file name")]
    EmptySlug(String),

    #[error("unsupported glob '{0}': recursive '**' patterns are not supported")]
    RecursiveGlob(String),

    #[error("invalid glob segment '{segment}': {reason}")]
    InvalidGlob { segment: String, reason: String },

    #[error("hidden paths are not allowed:\n{}", bullet_list(.0))]
    HiddenPaths(Vec<String>),

    #[error("input files not found:\n{}", bullet_list(.0))]
    MissingFiles(Vec<String>),

    #[error("invalid locator strategy '{0}': expected 'testid' or 'css'")]
    InvalidLocator(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, PlayplanError>;
