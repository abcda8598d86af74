//! External toolchain collaborators.
//!
//! The harness itself never compiles or instruments anything. These thin wrappers spawn the configured tools:
//!
//! - `build` - compile the C source into an executable (`<compiler> <args...> -o <exe> <source>`)
//! - `coverage` - run the coverage tool over the source once the fixtures have run

pub mod build;
pub mod coverage;

pub use build::{BuildError, BuildOutput, build, executable_path};
pub use coverage::{CoverageError, run_coverage};
