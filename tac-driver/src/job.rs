//! Compile jobs
//! 
//! A job takes source text, stages it in a uniquely named file, runs the
//! front end over it, lowers the IR the front end produced and reports the
//! assembly. The staged file is removed however the job ends, and a failed
//! job never reports or writes partial assembly.

use crate::config::JobConfig;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Outcome of a job, in the shape returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResponse {
    pub output: String,
    pub success: bool,
}

impl CompileResponse {
    pub fn success(output: String) -> Self {
        Self { output, success: true }
    }

    pub fn failure(message: String) -> Self {
        Self {
            output: message,
            success: false,
        }
    }
}

/// Source to IR translation step
pub trait FrontEnd {
    /// Translate the staged `source`, leaving IR at `ir_path`
    fn translate(&self, source: &Path, ir_path: &Path) -> Result<()>;
}

/// Front end run as a subprocess
#[derive(Debug, Clone)]
pub struct CommandFrontEnd {
    program: String,
    args: Vec<String>,
}

impl CommandFrontEnd {
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("No front end command configured")?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl FrontEnd for CommandFrontEnd {
    fn translate(&self, source: &Path, _ir_path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(source);
        debug!("Running: {:?}", cmd);

        let output = cmd
            .output()
            .with_context(|| format!("Failed to start front end '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("Compilation failed:\n{}", stderr);
        }
        Ok(())
    }
}

/// Run one job. Failures are folded into the response.
pub fn run_job(source: &str, config: &JobConfig, front_end: &dyn FrontEnd) -> CompileResponse {
    let job_id = Uuid::new_v4().simple().to_string();
    match compile_source(&job_id, source, config, front_end) {
        Ok(asm) => {
            info!("job {}: success", job_id);
            CompileResponse::success(asm)
        }
        Err(e) => {
            warn!("job {}: {:#}", job_id, e);
            CompileResponse::failure(format!("{:#}", e))
        }
    }
}

fn compile_source(
    job_id: &str,
    source: &str,
    config: &JobConfig,
    front_end: &dyn FrontEnd,
) -> Result<String> {
    std::fs::create_dir_all(&config.input_dir).with_context(|| {
        format!("Failed to create input directory {}", config.input_dir.display())
    })?;

    // Removed on drop, including on every early return below
    let mut staged = tempfile::Builder::new()
        .prefix(&format!("input_temp_{}", job_id))
        .suffix(".c")
        .rand_bytes(0)
        .tempfile_in(&config.input_dir)
        .context("Failed to save input file")?;
    write_source(&mut staged, source)?;
    debug!("job {}: staged source at {}", job_id, staged.path().display());

    // Never pick up IR left behind by an earlier job
    match std::fs::remove_file(&config.ir_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to clear stale IR {}", config.ir_path.display())
            })
        }
    }

    front_end.translate(staged.path(), &config.ir_path)?;

    let report = tac_ir::load_ir(&config.ir_path)
        .with_context(|| format!("Failed to read IR from {}", config.ir_path.display()))?;
    for diag in &report.diagnostics {
        debug!("job {}: {}", job_id, diag);
    }

    let program = tac_backend::generate(&report.instructions, &config.generator_options())?;
    let asm = program.to_text();

    std::fs::write(&config.output_path, &asm).with_context(|| {
        format!("Failed to write output file {}", config.output_path.display())
    })?;
    Ok(asm)
}

fn write_source(file: &mut NamedTempFile, source: &str) -> Result<()> {
    file.write_all(source.as_bytes())
        .and_then(|_| file.flush())
        .context("Failed to save input file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Front end that writes canned IR and remembers what it was given
    struct StubFrontEnd {
        ir: Option<&'static str>,
        staged: RefCell<Option<PathBuf>>,
        seen_source: RefCell<String>,
    }

    impl StubFrontEnd {
        fn new(ir: Option<&'static str>) -> Self {
            Self {
                ir,
                staged: RefCell::new(None),
                seen_source: RefCell::new(String::new()),
            }
        }
    }

    impl FrontEnd for StubFrontEnd {
        fn translate(&self, source: &Path, ir_path: &Path) -> Result<()> {
            *self.staged.borrow_mut() = Some(source.to_path_buf());
            *self.seen_source.borrow_mut() = std::fs::read_to_string(source)?;
            match self.ir {
                Some(ir) => {
                    std::fs::create_dir_all(ir_path.parent().unwrap())?;
                    std::fs::write(ir_path, ir)?;
                    Ok(())
                }
                None => bail!("Compilation failed:\nsyntax error"),
            }
        }
    }

    /// Front end that succeeds without producing any IR
    struct SilentFrontEnd;

    impl FrontEnd for SilentFrontEnd {
        fn translate(&self, _source: &Path, _ir_path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn config_in(dir: &Path) -> JobConfig {
        JobConfig {
            frontend: Vec::new(),
            input_dir: dir.join("input"),
            ir_path: dir.join("output/output.txt"),
            output_path: dir.join("armv8_output.s"),
            strict_branches: true,
        }
    }

    #[test]
    fn test_successful_job() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let front_end = StubFrontEnd::new(Some("0\t(PRINT, #5, , )\n"));

        let response = run_job("int main() { print(5); }", &config, &front_end);

        assert!(response.success, "{}", response.output);
        assert!(response.output.contains("BL print_int"));
        assert_eq!(std::fs::read_to_string(&config.output_path).unwrap(), response.output);
        assert_eq!(*front_end.seen_source.borrow(), "int main() { print(5); }");

        let staged = front_end.staged.borrow().clone().unwrap();
        let name = staged.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("input_temp_") && name.ends_with(".c"));
        assert!(!staged.exists());
    }

    #[test]
    fn test_front_end_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let front_end = StubFrontEnd::new(None);

        let response = run_job("garbage", &config, &front_end);

        assert!(!response.success);
        assert!(response.output.contains("syntax error"));
        assert!(!front_end.staged.borrow().clone().unwrap().exists());
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_backend_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let front_end = StubFrontEnd::new(Some("0\t(JP, done, , )\n"));

        let response = run_job("x", &config, &front_end);

        assert!(!response.success);
        assert!(response.output.contains("Unresolved branch target 'done'"));
        assert!(!config.output_path.exists());
        assert!(!front_end.staged.borrow().clone().unwrap().exists());
    }

    #[test]
    fn test_missing_ir_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let response = run_job("x", &config, &SilentFrontEnd);
        assert!(!response.success);
        assert!(response.output.contains("Failed to read IR"));
    }

    #[test]
    fn test_stale_ir_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir_all(config.ir_path.parent().unwrap()).unwrap();
        std::fs::write(&config.ir_path, "0\t(PRINT, #7, , )\n").unwrap();

        let response = run_job("x", &config, &SilentFrontEnd);

        assert!(!response.success);
        assert!(response.output.contains("Failed to read IR"));
        assert!(!config.ir_path.exists());
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_stale_ir_that_cannot_be_cleared_fails_the_job() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        // A directory at the IR path cannot be removed as a file
        std::fs::create_dir_all(&config.ir_path).unwrap();

        let response = run_job("x", &config, &SilentFrontEnd);

        assert!(!response.success);
        assert!(response.output.contains("Failed to clear stale IR"));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_output_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.output_path = dir.path().join("missing/armv8_output.s");
        let front_end = StubFrontEnd::new(Some("0\t(PRINT, #5, , )\n"));

        let response = run_job("x", &config, &front_end);

        assert!(!response.success);
        assert!(response.output.contains("Failed to write output file"));
        assert!(!response.output.contains("BL print_int"));
        assert!(!config.output_path.exists());
        assert!(!front_end.staged.borrow().clone().unwrap().exists());
    }

    #[test]
    fn test_command_front_end_requires_a_program() {
        assert!(CommandFrontEnd::from_command_line(&[]).is_err());
        assert!(CommandFrontEnd::from_command_line(&["python3".to_string()]).is_ok());
    }

    #[test]
    fn test_response_json_shape() {
        let json = serde_json::to_string(&CompileResponse::failure("boom".to_string())).unwrap();
        assert_eq!(json, r#"{"output":"boom","success":false}"#);
    }
}
