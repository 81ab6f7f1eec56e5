//! Output formatters for duplicate scan results.
//!
//! - [`text`]: Human-readable group blocks and a summary line
//! - [`json`]: Machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupehound::duplicates::DuplicateFinder;
//! use dupehound::error::ExitCode;
//! use dupehound::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
