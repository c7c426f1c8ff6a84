//! Plan-to-Playwright translation.
//!
//! [`translate`] is pure: the same plan and options always produce
//! byte-identical output, so regenerated specs diff cleanly.

use crate::error::{PlayplanError, Result};
use crate::plan::{Plan, Step, Test};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DEFAULT_EXTENSION: &str = "spec.ts";

const FILE_HEADER: &str = "\
// Generated by playplan. Do not edit by hand; edit the plan and regenerate.
import { expect, test, type Page, type TestInfo } from \"@playwright/test\";

async function withStepContext(
  page: Page,
  testInfo: TestInfo,
  context: { index: number; action: string; target?: string },
  body: () => Promise<void>,
): Promise<void> {
  try {
    await body();
  } catch (error) {
    await testInfo.attach(`step-${context.index}-context`, {
      body: JSON.stringify({ url: page.url(), ...context }, null, 2),
      contentType: \"application/json\",
    });
    throw error;
  }
}
";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How a step `target` becomes a Playwright locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// `page.getByTestId(target)`
    #[default]
    Testid,
    /// `page.locator(target)`, target is a CSS selector
    Css,
}

impl LocatorStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            LocatorStrategy::Testid => "testid",
            LocatorStrategy::Css => "css",
        }
    }

    fn render(self, target: &str) -> String {
        match self {
            LocatorStrategy::Testid => format!("page.getByTestId({})", js_string(target)),
            LocatorStrategy::Css => format!("page.locator({})", js_string(target)),
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocatorStrategy {
    type Err = PlayplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "testid" => Ok(LocatorStrategy::Testid),
            "css" => Ok(LocatorStrategy::Css),
            _ => Err(PlayplanError::InvalidLocator(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// File extension without the leading dot.
    pub extension: String,
    pub locator: LocatorStrategy,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            locator: LocatorStrategy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratedFile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the tests directory.
    pub path: PathBuf,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

pub fn translate(plan: &Plan, options: &TranslateOptions) -> Result<GeneratedFile> {
    let slug = slugify(&plan.suite_name);
    if slug.is_empty() {
        return Err(PlayplanError::EmptySlug(plan.suite_name.clone()));
    }

    let mut out = String::from(FILE_HEADER);
    out.push('\n');
    render_suite(&mut out, plan, options);

    Ok(GeneratedFile {
        path: PathBuf::from(format!("{slug}.{}", options.extension)),
        content: out,
    })
}

fn render_suite(out: &mut String, plan: &Plan, options: &TranslateOptions) {
    let _ = writeln!(out, "test.describe({}, {{", js_string(&plan.suite_name));
    let _ = writeln!(
        out,
        "  annotation: {{ type: \"source\", description: {} }},",
        js_string(&plan.source.describe())
    );
    if let Some(tag) = format_tags(plan.tags()) {
        let _ = writeln!(out, "  tag: {tag},");
    }
    out.push_str("}, () => {\n");

    for (i, test) in plan.tests.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_test(out, test, plan.tags(), options);
    }

    out.push_str("});\n");
}

fn render_test(out: &mut String, test: &Test, suite_tags: &[String], options: &TranslateOptions) {
    let tags = dedupe_tags(test.tags(), suite_tags);
    let details = match format_tags(&tags) {
        Some(tag) => format!("{{ tag: {tag} }}, "),
        None => String::new(),
    };

    let _ = writeln!(
        out,
        "  test({}, {details}async ({{ page }}, testInfo) => {{",
        js_string(&test.name)
    );
    let _ = writeln!(out, "    await page.goto({});", js_string(&test.start_url));
    out.push('\n');

    for (i, step) in test.steps.iter().enumerate() {
        render_step(out, step, i + 1, options);
        out.push('\n');
    }

    out.push_str("  });\n");
}

/// Render one step block at test-body indentation. Every step runs inside
/// `withStepContext` so a failure carries the URL, step index, action and,
/// for locator steps, the target.
fn render_step(out: &mut String, step: &Step, index: usize, options: &TranslateOptions) {
    let body: Vec<String> = match step {
        Step::Goto { value } => vec![format!("await page.goto({});", js_string(value))],
        Step::ExpectUrl { value } => {
            vec![format!("await expect(page).toHaveURL({});", url_pattern(value))]
        }
        Step::Click { .. } => vec!["await locator.click();".to_string()],
        Step::Fill { value, .. } => vec![format!("await locator.fill({});", js_string(value))],
        Step::Select { value, .. } => {
            vec![format!("await locator.selectOption({});", js_string(value))]
        }
        Step::ExpectVisible { .. } => vec!["await expect(locator).toBeVisible();".to_string()],
        Step::ExpectNotVisible { .. } => vec!["await expect(locator).toBeHidden();".to_string()],
        Step::ExpectText { value, .. } => vec![format!(
            "await expect(locator).toContainText({});",
            js_string(value)
        )],
    };

    let action = js_string(step.action().as_str());
    match step.target() {
        Some(target) => {
            let _ = writeln!(
                out,
                "    await withStepContext(page, testInfo, {{ index: {index}, action: {action}, target: {} }}, async () => {{",
                js_string(target)
            );
            let _ = writeln!(out, "      const locator = {};", options.locator.render(target));
            out.push_str("      await expect(locator).toHaveCount(1);\n");
        }
        None => {
            let _ = writeln!(
                out,
                "    await withStepContext(page, testInfo, {{ index: {index}, action: {action} }}, async () => {{"
            );
        }
    }
    for line in body {
        let _ = writeln!(out, "      {line}");
    }
    out.push_str("    });\n");
}

/// Test tags minus any already applied at suite level, order kept.
fn dedupe_tags(tags: &[String], suite_tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter(|t| !suite_tags.contains(t))
        .cloned()
        .collect()
}

/// The distinct step targets of a test, in first-seen order. Each one is a
/// hook the application must expose for the generated spec to run.
pub fn required_test_hooks(test: &Test) -> Vec<String> {
    let mut hooks: Vec<String> = Vec::new();
    for target in test.steps.iter().filter_map(Step::target) {
        if !hooks.iter().any(|h| h == target) {
            hooks.push(target.to_string());
        }
    }
    hooks
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `None` for no tags, a bare string for one, an array literal otherwise.
pub fn format_tags(tags: &[String]) -> Option<String> {
    match tags {
        [] => None,
        [single] => Some(js_string(single)),
        many => Some(format!(
            "[{}]",
            many.iter().map(|t| js_string(t)).collect::<Vec<_>>().join(", ")
        )),
    }
}

/// Regex literal matching `value` as a literal substring anywhere in the URL.
pub fn url_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('/');
    for c in value.chars() {
        match c {
            '^' | '$' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
            | '/' => {
                pattern.push('\\');
                pattern.push(c);
            }
            // Line terminators cannot appear raw inside a regex literal.
            '\n' => pattern.push_str("\\n"),
            '\r' => pattern.push_str("\\r"),
            '\u{2028}' => pattern.push_str("\\u2028"),
            '\u{2029}' => pattern.push_str("\\u2029"),
            c => pattern.push(c),
        }
    }
    pattern.push('/');
    pattern
}

static NON_SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn non_slug_re() -> &'static Regex {
    NON_SLUG_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Lowercase, collapse every run outside `[a-z0-9]` to `-`, trim dashes.
/// Names with no ASCII letters or digits yield an empty slug.
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    non_slug_re()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Double-quoted JS string literal. The escaping is also valid JSON, which
/// [`extract_description`] relies on.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Provenance extraction
// ---------------------------------------------------------------------------

static DESCRIPTION_RE: OnceLock<Regex> = OnceLock::new();

fn description_re() -> &'static Regex {
    DESCRIPTION_RE.get_or_init(|| Regex::new(r#"description:\s*("(?:[^"\\]|\\.)*")"#).unwrap())
}

/// Read back the source annotation embedded by [`translate`].
pub fn extract_description(content: &str) -> Option<String> {
    let literal = description_re().captures(content)?.get(1)?.as_str();
    serde_json::from_str(literal).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
