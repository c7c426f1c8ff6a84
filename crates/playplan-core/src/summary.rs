use crate::error::Result;
use crate::paths;
use crate::ports::FileSystem;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const NEXT_STEPS: &[&str] = &[
    "Expose every hook listed under \"Required test hooks\" as a `data-testid` in the application.",
    "Run `npx playwright test` against the generated files.",
    "Edit the plan, not the generated spec; re-running generate-tests overwrites outputs.",
];

// ---------------------------------------------------------------------------
// SummaryEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTest {
    pub name: String,
    pub required_test_hooks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutputs {
    /// The plan file that was read.
    pub plan: String,
    /// The spec file that was written.
    pub test: String,
}

/// One successfully translated plan. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Descriptive source path read back from the generated spec.
    pub input: String,
    pub outputs: SummaryOutputs,
    pub tests: Vec<SummaryTest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_date: String,
    pub entries: Vec<SummaryEntry>,
}

impl RunSummary {
    pub fn new(started: DateTime<Utc>) -> Self {
        Self {
            run_date: started.to_rfc3339_opts(SecondsFormat::Millis, true),
            entries: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryWriter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Accumulates entries for one run. The JSON batch file is rewritten after
/// every append so an interrupted run leaves the entries written so far.
pub struct SummaryWriter<'a> {
    fs: &'a dyn FileSystem,
    paths: SummaryPaths,
    summary: RunSummary,
}

impl<'a> SummaryWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, summary_dir: &Path, started: DateTime<Utc>) -> Self {
        Self {
            fs,
            paths: SummaryPaths {
                json: paths::summary_json_path(summary_dir, started),
                markdown: paths::summary_markdown_path(summary_dir, started),
            },
            summary: RunSummary::new(started),
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn append(&mut self, entry: SummaryEntry) -> Result<()> {
        self.summary.entries.push(entry);
        self.flush_json()
    }

    /// Write the final JSON batch and the Markdown report derived from it.
    pub fn finish(self) -> Result<SummaryPaths> {
        self.flush_json()?;
        let markdown = render_markdown(&self.summary);
        self.fs.write_atomic(&self.paths.markdown, markdown.as_bytes())?;
        Ok(self.paths)
    }

    fn flush_json(&self) -> Result<()> {
        if let Some(parent) = self.paths.json.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut data = serde_json::to_string_pretty(&self.summary)?;
        data.push('\n');
        self.fs.write_atomic(&self.paths.json, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

pub fn render_markdown(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("# Test generation summary\n\n");
    let _ = writeln!(out, "Run: {}\n", summary.run_date);

    out.push_str("## Inputs\n\n");
    for input in unique(summary.entries.iter().map(|e| e.input.as_str())) {
        let _ = writeln!(out, "- {input}");
    }

    out.push_str("\n## Outputs\n\n");
    for output in unique(summary.entries.iter().map(|e| e.outputs.test.as_str())) {
        let _ = writeln!(out, "- {output}");
    }

    out.push_str("\n## Next steps\n\n");
    for step in NEXT_STEPS {
        let _ = writeln!(out, "- {step}");
    }

    out.push_str("\n## Required test hooks\n");
    for (output, tests) in hooks_by_output(summary) {
        let _ = writeln!(out, "\n### {output}");
        for (name, hooks) in tests {
            let _ = writeln!(out, "\n#### {name}\n");
            if hooks.is_empty() {
                out.push_str("- _none_\n");
            }
            for hook in hooks {
                let _ = writeln!(out, "- `{hook}`");
            }
        }
    }

    out
}

fn unique<'s>(items: impl Iterator<Item = &'s str>) -> Vec<&'s str> {
    let mut out: Vec<&str> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

type TestHooks<'s> = Vec<(&'s str, Vec<&'s str>)>;

/// Output file → test name → hooks, all in first-seen order. Entries that
/// wrote the same output merge.
fn hooks_by_output(summary: &RunSummary) -> Vec<(&str, TestHooks<'_>)> {
    let mut groups: Vec<(&str, TestHooks<'_>)> = Vec::new();
    for entry in &summary.entries {
        let idx = match groups.iter().position(|(o, _)| *o == entry.outputs.test) {
            Some(i) => i,
            None => {
                groups.push((entry.outputs.test.as_str(), Vec::new()));
                groups.len() - 1
            }
        };
        let tests = &mut groups[idx].1;
        for test in &entry.tests {
            let hooks = match tests.iter().position(|(n, _)| *n == test.name) {
                Some(i) => &mut tests[i].1,
                None => {
                    tests.push((test.name.as_str(), Vec::new()));
                    let last = tests.len() - 1;
                    &mut tests[last].1
                }
            };
            for hook in &test.required_test_hooks {
                if !hooks.contains(&hook.as_str()) {
                    hooks.push(hook.as_str());
                }
            }
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
