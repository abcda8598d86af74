//! Run the coverage tool after the fixtures.
//!
//! Output goes straight to the terminal; nothing the tool prints is consumed.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::config::HarnessConfig;
use crate::process::exit_code;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to start coverage tool `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("coverage tool `{tool}` exited with code {exit_code}")]
    Failed { tool: String, exit_code: i32 },
}

/// Invoke `<coverageTool> <coverageToolArgs...> <source>` and wait for it.
#[tracing::instrument(skip_all, fields(source = %source.display(), tool = %config.coverage_tool))]
pub fn run_coverage(source: &Path, config: &HarnessConfig) -> Result<(), CoverageError> {
    let status = Command::new(&config.coverage_tool)
        .args(&config.coverage_tool_args)
        .arg(source)
        .status()
        .map_err(|source| CoverageError::Spawn {
            tool: config.coverage_tool.clone(),
            source,
        })?;

    if !status.success() {
        return Err(CoverageError::Failed {
            tool: config.coverage_tool.clone(),
            exit_code: exit_code(status),
        });
    }
    Ok(())
}
