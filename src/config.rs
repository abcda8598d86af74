//! Harness configuration.
//!
//! A [`HarnessConfig`] is built once at startup: the built-in defaults, overlaid with whatever keys an optional
//! `ctestconfig.json` provides. It is never mutated afterwards and is passed around by reference.
//!
//! Keys are camelCase (`compilerArgs`, `testsDirectory`, ...). The snake_case names used by older
//! configuration files (`args`, `coverage_meter`, `tests_dir`, ...) are accepted as aliases. Unknown keys are
//! ignored. Argument lists may be given either as a single whitespace-separated string or as an array of strings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, TryFromFloatSecsError};

use ctest_core::DEFAULT_FIXTURE_PATTERN;
use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when no explicit configuration path is given.
pub const CONFIG_FILE_NAME: &str = "ctestconfig.json";

const DEFAULT_COMPILER_ARGS: &str = "--std=c99 -Wall -Werror -Wfloat-conversion -Wfloat-equal --coverage";

/// Errors raised while loading the configuration overlay.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file `{0}` does not exist")]
    Missing(PathBuf),

    #[error("failed to read configuration file `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`timeoutSeconds` in `{path}` is out of range: {value}")]
    Timeout {
        path: PathBuf,
        value: f64,
        #[source]
        source: TryFromFloatSecsError,
    },
}

/// Fully resolved harness settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Compiler executable (looked up on `PATH`)
    pub compiler: String,
    /// Arguments passed before `-o <exe> <source>`
    pub compiler_args: Vec<String>,
    /// Coverage tool executable
    pub coverage_tool: String,
    /// Arguments passed before the source path
    pub coverage_tool_args: Vec<String>,
    /// Directory holding the fixture files
    pub tests_directory: PathBuf,
    /// Regular expression with kind, sequence and role capture groups
    pub fixture_name_pattern: String,
    /// WHATWG encoding label used for fixtures and captured output
    pub text_encoding: String,
    /// Per-case time limit; `None` waits for the program however long it takes
    pub timeout: Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            compiler_args: split_args(DEFAULT_COMPILER_ARGS),
            coverage_tool: "gcov".to_string(),
            coverage_tool_args: vec!["-b".to_string()],
            tests_directory: PathBuf::from("func_tests"),
            fixture_name_pattern: DEFAULT_FIXTURE_PATTERN.to_string(),
            text_encoding: "utf-8".to_string(),
            timeout: None,
        }
    }
}

/// Either `"-a -b"` or `["-a", "-b"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArgList {
    Line(String),
    List(Vec<String>),
}

impl ArgList {
    fn into_args(self) -> Vec<String> {
        match self {
            ArgList::Line(line) => split_args(&line),
            ArgList::List(list) => list,
        }
    }
}

/// Keys a configuration file may set; everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOverlay {
    compiler: Option<String>,
    #[serde(alias = "args")]
    compiler_args: Option<ArgList>,
    #[serde(alias = "coverage_meter")]
    coverage_tool: Option<String>,
    #[serde(alias = "coverage_meter_args")]
    coverage_tool_args: Option<ArgList>,
    #[serde(alias = "tests_dir")]
    tests_directory: Option<PathBuf>,
    #[serde(alias = "test_file_regex")]
    fixture_name_pattern: Option<String>,
    #[serde(alias = "tests_encoding")]
    text_encoding: Option<String>,
    timeout_seconds: Option<f64>,
}

impl HarnessConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the JSON object in `text`.
    ///
    /// `origin` is only used to label errors.
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let overlay: ConfigOverlay = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::default().overlay(overlay, origin)
    }

    /// Load the configuration for a run started in `dir`.
    ///
    /// An explicit path must exist. Without one, `ctestconfig.json` in `dir` is used when present and the defaults
    /// otherwise.
    pub fn load(dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        tracing::info!(path = %path.display(), "loading configuration");
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_json_str(&text, &path)
    }

    fn overlay(mut self, overlay: ConfigOverlay, origin: &Path) -> Result<Self, ConfigError> {
        if let Some(compiler) = overlay.compiler {
            self.compiler = compiler;
        }
        if let Some(args) = overlay.compiler_args {
            self.compiler_args = args.into_args();
        }
        if let Some(tool) = overlay.coverage_tool {
            self.coverage_tool = tool;
        }
        if let Some(args) = overlay.coverage_tool_args {
            self.coverage_tool_args = args.into_args();
        }
        if let Some(dir) = overlay.tests_directory {
            self.tests_directory = dir;
        }
        if let Some(pattern) = overlay.fixture_name_pattern {
            self.fixture_name_pattern = pattern;
        }
        if let Some(encoding) = overlay.text_encoding {
            self.text_encoding = encoding;
        }
        if let Some(secs) = overlay.timeout_seconds {
            self.timeout = timeout_from_secs(secs).map_err(|source| ConfigError::Timeout {
                path: origin.to_path_buf(),
                value: secs,
                source,
            })?;
        }
        Ok(self)
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_tests_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tests_directory = dir.into();
        self
    }

    pub fn with_fixture_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.fixture_name_pattern = pattern.into();
        self
    }

    pub fn with_text_encoding(mut self, label: impl Into<String>) -> Self {
        self.text_encoding = label.into();
        self
    }

    /// Set the per-case time limit (`None` disables it)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Zero or negative seconds disable the limit.
///
/// ## Errors
/// NaN, infinity and values too large for a [`Duration`].
pub fn timeout_from_secs(secs: f64) -> Result<Option<Duration>, TryFromFloatSecsError> {
    if secs <= 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs).map(Some)
}

fn split_args(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
