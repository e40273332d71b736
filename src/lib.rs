//! # Rainbow Table
//!
//! Builds a digest → word lookup table from a wordlist.
//!
//! ## Features
//!
//! - **Algorithms**: MD5, SHA-1, SHA-2, SHA-3, SHAKE (fixed at 32 bytes), BLAKE2 and RIPEMD-160, or all at once
//! - **Streaming input**: wordlists of any size are read line by line
//! - **Encodings**: UTF-8 by default, legacy encodings by label, or auto-detection
//! - **Append-only storage**: SQLite `rainbow(hash TEXT PRIMARY KEY, word TEXT)`; re-runs add to it
//! - **Conflict reporting**: a hash that is already present is reported and the existing row kept
//!
//! ## Usage
//!
//! ```bash
//! # All algorithms into rainbow.db
//! rainbow-table -w rockyou.txt
//!
//! # SHA-256 only
//! rainbow-table -w rockyou.txt -t sha256 -d sha256.db
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use rainbow_table::pipeline::{BuildConfig, Pipeline};
//!
//! let config = BuildConfig::new("rainbow.db", "linux.words", "md5");
//! let report = Pipeline::new(config).run().unwrap();
//! println!("{} rows inserted, {} conflicts", report.inserted, report.conflicts);
//! ```

pub mod algorithm;
pub mod cli;
pub mod error;
pub mod hasher;
pub mod pipeline;
pub mod progress;
pub mod store;
pub mod wordlist;

pub use algorithm::Algorithm;
pub use cli::Args;
pub use error::{BuildError, Error, Result};
pub use pipeline::{BuildConfig, BuildReport, Pipeline};
pub use store::{InsertOutcome, TableStore};
