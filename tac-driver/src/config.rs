use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tac_backend::GeneratorOptions;

/// Compile job configuration, loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Front end command line; the staged source path is appended
    pub frontend: Vec<String>,
    /// Directory that receives staged sources
    pub input_dir: PathBuf,
    /// Where the front end leaves its IR
    pub ir_path: PathBuf,
    /// Where the generated assembly is written
    pub output_path: PathBuf,
    pub strict_branches: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            frontend: Vec::new(),
            input_dir: PathBuf::from("input"),
            ir_path: PathBuf::from("output/output.txt"),
            output_path: PathBuf::from("armv8_output.s"),
            strict_branches: true,
        }
    }
}

impl JobConfig {
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            strict_branches: self.strict_branches,
            ..GeneratorOptions::default()
        }
    }
}

/// Load job configuration from a JSON file
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: JobConfig = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}
