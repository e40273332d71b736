//! Command-line interface definition for rainbow-table
//!
//! Provides argument parsing for the table builder.

use clap::Parser;
use std::path::PathBuf;

use crate::wordlist::LineEndings;

/// Build a digest → word lookup table from a wordlist
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rainbow-table",
    author = "m0h1nd4",
    version,
    about = "Build a digest → word lookup table from a wordlist",
    long_about = r#"
Hash every word of a wordlist with one or all supported algorithms and store
the (hash, word) pairs in a SQLite table `rainbow(hash TEXT PRIMARY KEY, word TEXT)`.
Building into an existing database adds to it; hashes already present are
reported and kept.

EXAMPLES:
    # Every supported algorithm into rainbow.db
    rainbow-table -w rockyou.txt

    # MD5 only, into a specific database
    rainbow-table -w rockyou.txt -t md5 -d md5.db

    # Latin-1 wordlist, committing every million rows
    rainbow-table -w rockyou.txt --encoding latin1 --commit-every 1000000

ALGORITHMS:
    md5, sha1, sha224, sha256, sha384, sha512, sha512_224, sha512_256,
    sha3_224, sha3_256, sha3_384, sha3_512, shake_128, shake_256,
    blake2b, blake2s, ripemd160, all
"#
)]
pub struct Args {
    /// SQLite database to fill with hashes (created if missing)
    #[arg(short, long = "database", visible_alias = "db", value_name = "PATH", default_value = "rainbow.db")]
    pub database: PathBuf,

    /// Wordlist to read from and hash, one word per line
    #[arg(short, long, value_name = "PATH", default_value = "linux.words")]
    pub wordlist: PathBuf,

    /// Algorithm to hash with, or "all"
    #[arg(short = 't', long = "type", value_name = "ALGORITHM", default_value = "all")]
    pub hash_type: String,

    /// Hash and store words with a trailing \n, keeping blank lines
    #[arg(long, default_value_t = false)]
    pub keep_line_endings: bool,

    /// Wordlist encoding: "utf-8", any encoding label (e.g. "latin1"), or "auto"
    #[arg(long, value_name = "ENCODING", default_value = "utf-8")]
    pub encoding: String,

    /// Commit every N inserted rows instead of once at the end
    #[arg(long, value_name = "N")]
    pub commit_every: Option<u64>,

    /// Number of threads for digesting (default: auto-detect)
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Print the supported algorithms and exit
    #[arg(long, default_value_t = false)]
    pub list_algorithms: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// `RUST_LOG` level for the chosen verbosity
    ///
    /// Quiet mode still shows warnings so hash conflicts and skipped lines
    /// are reported.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    pub fn line_endings(&self) -> LineEndings {
        if self.keep_line_endings {
            LineEndings::Keep
        } else {
            LineEndings::Strip
        }
    }
}
