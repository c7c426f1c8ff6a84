use crate::driver::{GenerateArgs, UsageError};
use anyhow::Context;
use clap::Parser;
use playplan_core::config::{GeneratorConfig, WarnLevel};
use playplan_core::translate::LocatorStrategy;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "generate-tests",
    about = "Compile JSON UI test plans into Playwright spec files",
    version
)]
pub struct Cli {
    /// Plan files or single-level glob patterns (e.g. plans/*.json)
    #[arg(required = true, value_name = "PLAN")]
    pub inputs: Vec<String>,

    /// Directory for generated spec files
    #[arg(long, env = "PLAYPLAN_TESTS_DIR", value_name = "DIR")]
    pub tests_dir: Option<PathBuf>,

    /// Directory for the per-run summary (JSON + Markdown)
    #[arg(long, env = "PLAYPLAN_SUMMARY_DIR", value_name = "DIR")]
    pub summary_dir: Option<PathBuf>,

    /// Config file (default: ./playplan.yaml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extension of generated files, without the leading dot
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// How step targets become locators: testid or css
    #[arg(long, value_name = "STRATEGY")]
    pub locator: Option<LocatorStrategy>,

    /// Print the run summary as JSON on stdout
    #[arg(long, short = 'j')]
    pub json: bool,
}

impl Cli {
    /// Merge flags over the config file found in `cwd`.
    pub fn into_generate_args(self, cwd: &Path) -> anyhow::Result<GenerateArgs> {
        let mut config = GeneratorConfig::discover(cwd, self.config.as_deref())
            .context("failed to load config")?;

        if let Some(dir) = self.tests_dir {
            config.tests_dir = Some(dir);
        }
        if let Some(dir) = self.summary_dir {
            config.summary_dir = Some(dir);
        }
        if let Some(ext) = self.extension {
            config.extension = ext;
        }
        if let Some(locator) = self.locator {
            config.locator = locator;
        }

        let mut errors = Vec::new();
        for warning in config.validate() {
            match warning.level {
                WarnLevel::Warning => tracing::warn!("{}", warning.message),
                WarnLevel::Error => errors.push(warning.message),
            }
        }
        if !errors.is_empty() {
            return Err(UsageError(errors.join("; ")).into());
        }

        let tests_dir = config
            .tests_dir
            .clone()
            .ok_or_else(|| UsageError("missing required flag --tests-dir".to_string()))?;
        let summary_dir = config
            .summary_dir
            .clone()
            .ok_or_else(|| UsageError("missing required flag --summary-dir".to_string()))?;

        Ok(GenerateArgs {
            inputs: self.inputs,
            tests_dir,
            summary_dir,
            options: config.translate_options(),
        })
    }
}
