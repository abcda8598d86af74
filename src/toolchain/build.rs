//! Compile the program under test.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::HarnessConfig;
use crate::process::run_captured;

/// Errors raised by the build step.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to start compiler `{compiler}`")]
    Spawn {
        compiler: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{compiler}` exited with code {exit_code}")]
    Failed {
        compiler: String,
        exit_code: i32,
        /// Everything the compiler printed
        output: String,
    },
}

/// A successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub executable: PathBuf,
    /// Compiler output (usually warnings), possibly empty
    pub diagnostics: String,
}

/// Executable produced for `source`: same stem, `.exe` extension, next to the source.
///
/// A bare file name is anchored to the current directory so spawning it never falls back to a `PATH` lookup.
pub fn executable_path(source: &Path) -> PathBuf {
    let executable = source.with_extension("exe");
    match executable.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => executable,
        _ => Path::new(".").join(executable),
    }
}

/// Compile `source` with the configured compiler.
///
/// ## Errors
/// [`BuildError::Spawn`] if the compiler cannot be started, [`BuildError::Failed`] if it exits non-zero.
#[tracing::instrument(skip_all, fields(source = %source.display(), compiler = %config.compiler))]
pub fn build(source: &Path, config: &HarnessConfig) -> Result<BuildOutput, BuildError> {
    let executable = executable_path(source);

    let mut command = Command::new(&config.compiler);
    command.args(&config.compiler_args).arg("-o").arg(&executable).arg(source);
    tracing::debug!(args = ?config.compiler_args, executable = %executable.display(), "invoking compiler");

    let output = run_captured(command, Stdio::null(), None).map_err(|source| BuildError::Spawn {
        compiler: config.compiler.clone(),
        source,
    })?;

    let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
    diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.success() {
        return Err(BuildError::Failed {
            compiler: config.compiler.clone(),
            exit_code: output.exit_code,
            output: diagnostics,
        });
    }

    Ok(BuildOutput {
        executable,
        diagnostics,
    })
}
