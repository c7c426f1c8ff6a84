use anyhow::{bail, Context};
use playplan_core::ports::{Clock, Console, FileSystem};
use playplan_core::resolve::{resolve_inputs, ResolvedInput};
use playplan_core::summary::{
    RunSummary, SummaryEntry, SummaryOutputs, SummaryPaths, SummaryTest, SummaryWriter,
};
use playplan_core::translate::{
    extract_description, required_test_hooks, translate, TranslateOptions,
};
use playplan_core::validate::validate_plan;
use std::path::PathBuf;
use thiserror::Error;

/// A problem with how the tool was invoked rather than with an input file.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Plan paths or single-level glob patterns, in command-line order.
    pub inputs: Vec<String>,
    pub tests_dir: PathBuf,
    pub summary_dir: PathBuf,
    pub options: TranslateOptions,
}

pub struct Ports<'a> {
    pub fs: &'a dyn FileSystem,
    pub clock: &'a dyn Clock,
    pub console: &'a dyn Console,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub written: Vec<PathBuf>,
    pub summary_paths: SummaryPaths,
    pub summary: RunSummary,
}

/// Resolve inputs, translate each plan in order, and write the run summary.
///
/// Any failure stops the run at that file; outputs already written stay.
pub fn run(args: &GenerateArgs, ports: &Ports<'_>) -> anyhow::Result<RunOutcome> {
    let started = ports.clock.now();

    let inputs = resolve_inputs(&args.inputs, ports.fs, ports.console)?;
    if inputs.is_empty() {
        return Err(UsageError("no input files resolved".to_string()).into());
    }
    tracing::debug!(count = inputs.len(), "resolved inputs");

    let mut writer = SummaryWriter::new(ports.fs, &args.summary_dir, started);
    let mut written = Vec::with_capacity(inputs.len());

    for input in &inputs {
        let (out, entry) = generate_one(input, args, ports)?;
        written.push(out);
        writer
            .append(entry)
            .with_context(|| format!("failed to append summary entry for {}", input.original))?;
    }

    let summary = writer.summary().clone();
    let summary_paths = writer
        .finish()
        .context("failed to render summary markdown")?;
    ports.console.info(&format!(
        "Summary written to {} and {}",
        summary_paths.json.display(),
        summary_paths.markdown.display()
    ));

    Ok(RunOutcome {
        written,
        summary_paths,
        summary,
    })
}

fn generate_one(
    input: &ResolvedInput,
    args: &GenerateArgs,
    ports: &Ports<'_>,
) -> anyhow::Result<(PathBuf, SummaryEntry)> {
    let fs = ports.fs;
    let name = &input.original;

    let text = fs
        .read_to_string(&input.resolved)
        .with_context(|| format!("failed to read {name}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {name}"))?;
    let plan = validate_plan(value).with_context(|| format!("invalid plan {name}"))?;
    tracing::debug!(input = %name, tests = plan.tests.len(), "plan validated");

    let file = translate(&plan, &args.options).with_context(|| format!("failed to translate {name}"))?;

    fs.create_dir_all(&args.tests_dir)
        .with_context(|| format!("failed to create {}", args.tests_dir.display()))?;
    let out = args.tests_dir.join(&file.path);
    fs.write_atomic(&out, file.content.as_bytes())
        .with_context(|| format!("failed to write {}", out.display()))?;

    let written = fs
        .read_to_string(&out)
        .with_context(|| format!("failed to read back {}", out.display()))?;
    let Some(description) = extract_description(&written) else {
        bail!(
            "integrity check failed: {} has no source annotation",
            out.display()
        );
    };
    let expected = plan.source.describe();
    if description != expected {
        bail!(
            "integrity check failed: {} describes '{description}', expected '{expected}'",
            out.display()
        );
    }

    ports
        .console
        .info(&format!("Generated {} from {name}", out.display()));

    let entry = SummaryEntry {
        input: description,
        outputs: SummaryOutputs {
            plan: name.clone(),
            test: out.display().to_string(),
        },
        tests: plan
            .tests
            .iter()
            .map(|test| SummaryTest {
                name: test.name.clone(),
                required_test_hooks: required_test_hooks(test),
            })
            .collect(),
    };
    Ok((out, entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use playplan_core::ports::{BufferConsole, ConsoleLevel, FixedClock, RootedFileSystem};
    use playplan_core::PlayplanError;
    use std::path::Path;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "suiteName": "Sample plan",
  "source": {"repo": "r", "path": "p"},
  "tests": [{
    "name": "navigates to settings from home",
    "startUrl": "/",
    "steps": [
      {"action": "click", "target": "nav.link.settings"},
      {"action": "expectUrl", "value": "/settings"},
      {"action": "expectText", "target": "header.text.page-heading", "value": "Settings"}
    ]
  }]
}"#;

    struct Harness {
        dir: TempDir,
        fs: RootedFileSystem,
        clock: FixedClock,
        console: BufferConsole,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::Builder::new().prefix("playplan").tempdir().unwrap();
            let fs = RootedFileSystem::new(dir.path());
            Self {
                dir,
                fs,
                clock: FixedClock(Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap()),
                console: BufferConsole::new(),
            }
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn ports(&self) -> Ports<'_> {
            Ports {
                fs: &self.fs,
                clock: &self.clock,
                console: &self.console,
            }
        }

        fn read(&self, rel: &str) -> String {
            std::fs::read_to_string(self.dir.path().join(rel)).unwrap()
        }
    }

    fn args(inputs: &[&str]) -> GenerateArgs {
        GenerateArgs {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            tests_dir: PathBuf::from("tests"),
            summary_dir: PathBuf::from("summaries"),
            options: TranslateOptions::default(),
        }
    }

    #[test]
    fn generates_spec_and_summary() {
        let h = Harness::new();
        h.write("plans/sample.json", SAMPLE);

        let outcome = run(&args(&["plans/sample.json"]), &h.ports()).unwrap();

        assert_eq!(outcome.written, vec![PathBuf::from("tests/sample-plan.spec.ts")]);
        let spec = h.read("tests/sample-plan.spec.ts");
        assert!(spec.contains("test.describe(\"Sample plan\""));

        let entry = &outcome.summary.entries[0];
        assert_eq!(entry.input, "r/p");
        assert_eq!(entry.outputs.plan, "plans/sample.json");
        assert_eq!(entry.outputs.test, "tests/sample-plan.spec.ts");
        assert_eq!(
            entry.tests[0].required_test_hooks,
            vec!["nav.link.settings", "header.text.page-heading"]
        );

        let json = h.read("summaries/2026-10-15T09-00-00Z-summary.json");
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_date, "2026-10-15T09:00:00.000Z");
        assert_eq!(parsed.entries.len(), 1);

        let md = h.read("summaries/2026-10-15T09-00-00Z-summary.md");
        assert!(md.contains("- `nav.link.settings`"));

        let info = h.console.at(ConsoleLevel::Info);
        assert!(info[0].contains("Generated tests/sample-plan.spec.ts from plans/sample.json"));
    }

    #[test]
    fn processes_in_argument_order() {
        let h = Harness::new();
        h.write("plans/b.json", &SAMPLE.replace("Sample plan", "Beta"));
        h.write("plans/a.json", &SAMPLE.replace("Sample plan", "Alpha"));

        let outcome = run(&args(&["plans/b.json", "plans/a.json"]), &h.ports()).unwrap();
        assert_eq!(
            outcome.written,
            vec![
                PathBuf::from("tests/beta.spec.ts"),
                PathBuf::from("tests/alpha.spec.ts")
            ]
        );
    }

    #[test]
    fn invalid_json_names_the_file() {
        let h = Harness::new();
        h.write("plans/bad.json", "{ not json");
        let err = run(&args(&["plans/bad.json"]), &h.ports()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON in plans/bad.json"));
    }

    #[test]
    fn schema_failure_lists_fields() {
        let h = Harness::new();
        h.write(
            "plans/bad.json",
            r#"{"suiteName": "", "source": {"repo": "r", "path": "p"}, "tests": []}"#,
        );
        let err = run(&args(&["plans/bad.json"]), &h.ports()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid plan plans/bad.json"), "{msg}");
        assert!(msg.contains("  - suiteName: must not be empty"), "{msg}");
        assert!(msg.contains("  - tests: must contain at least one test"), "{msg}");
    }

    #[test]
    fn failure_stops_the_run() {
        let h = Harness::new();
        h.write("plans/a.json", "nope");
        h.write("plans/b.json", SAMPLE);
        assert!(run(&args(&["plans/a.json", "plans/b.json"]), &h.ports()).is_err());
        assert!(!h.dir.path().join("tests/sample-plan.spec.ts").exists());
    }

    #[test]
    fn missing_inputs_fail_before_any_write() {
        let h = Harness::new();
        h.write("plans/a.json", SAMPLE);
        let err = run(&args(&["plans/a.json", "gone.json"]), &h.ports()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlayplanError>(),
            Some(PlayplanError::MissingFiles(_))
        ));
        assert!(!h.dir.path().join("tests").exists());
    }

    #[test]
    fn nothing_resolved_is_usage_error() {
        let h = Harness::new();
        let err = run(&args(&["plans/*.json"]), &h.ports()).unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
        assert_eq!(h.console.at(ConsoleLevel::Warn).len(), 1);
    }

    /// Writes succeed but the content read back lacks the annotation.
    struct StrippingFs(RootedFileSystem);

    impl FileSystem for StrippingFs {
        fn read_to_string(&self, path: &Path) -> playplan_core::Result<String> {
            let text = self.0.read_to_string(path)?;
            Ok(text.replace("description:", "note:"))
        }
        fn write_atomic(&self, path: &Path, data: &[u8]) -> playplan_core::Result<()> {
            self.0.write_atomic(path, data)
        }
        fn create_dir_all(&self, path: &Path) -> playplan_core::Result<()> {
            self.0.create_dir_all(path)
        }
        fn read_dir_names(&self, path: &Path) -> playplan_core::Result<Vec<String>> {
            self.0.read_dir_names(path)
        }
        fn is_file(&self, path: &Path) -> bool {
            self.0.is_file(path)
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.exists(path)
        }
        fn canonicalize(&self, path: &Path) -> playplan_core::Result<PathBuf> {
            self.0.canonicalize(path)
        }
        fn current_dir(&self) -> playplan_core::Result<PathBuf> {
            self.0.current_dir()
        }
    }

    #[test]
    fn missing_annotation_is_integrity_error() {
        let h = Harness::new();
        h.write("plans/a.json", SAMPLE);
        let fs = StrippingFs(RootedFileSystem::new(h.dir.path()));
        let ports = Ports {
            fs: &fs,
            clock: &h.clock,
            console: &h.console,
        };
        let err = run(&args(&["plans/a.json"]), &ports).unwrap_err();
        assert!(err.to_string().contains("integrity check failed"));
        assert!(!h.dir.path().join("summaries").exists());
    }
}
