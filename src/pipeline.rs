//! Build pipeline
//!
//! Drives a build from an empty or existing database to a committed table:
//! `Init → SchemaReady → Streaming → Finalizing → Done`. A fatal error at any
//! point aborts the run and is reported together with the stage it hit.

use colored::*;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::algorithm::{self, Algorithm};
use crate::cli::Args;
use crate::error::{BuildError, Result};
use crate::hasher;
use crate::progress::{
    create_build_progress_bar, format_number, print_header, print_info, print_success, print_summary,
    print_warning, progress_message, BuildStats,
};
use crate::store::{InsertOutcome, RainbowEntry, Schema, TableStore};
use crate::wordlist::{InputEncoding, LineEndings, WordlistReader};

/// Lines between progress bar updates
const PROGRESS_INTERVAL: u64 = 4096;

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SchemaReady,
    Streaming,
    Finalizing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "store initialization",
            Self::SchemaReady => "wordlist setup",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalization",
            Self::Done => "completion",
        })
    }
}

/// Everything a build needs, resolved up front
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub database: PathBuf,
    pub wordlist: PathBuf,
    /// An algorithm name or `all`
    pub selector: String,
    pub line_endings: LineEndings,
    pub encoding: InputEncoding,
    /// Commit after this many inserted rows; `None` commits once at the end
    pub commit_every: Option<u64>,
    pub quiet: bool,
}

impl BuildConfig {
    pub fn new(database: impl Into<PathBuf>, wordlist: impl Into<PathBuf>, selector: &str) -> Self {
        Self {
            database: database.into(),
            wordlist: wordlist.into(),
            selector: selector.to_string(),
            line_endings: LineEndings::default(),
            encoding: InputEncoding::default(),
            commit_every: None,
            quiet: true,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            database: args.database.clone(),
            wordlist: args.wordlist.clone(),
            selector: args.hash_type.clone(),
            line_endings: args.line_endings(),
            encoding: InputEncoding::from_label(&args.encoding)?,
            commit_every: args.commit_every.filter(|&n| n > 0),
            quiet: args.quiet,
        })
    }
}

/// Outcome of a finished build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub schema: Schema,
    pub algorithms: Vec<Algorithm>,
    pub words: u64,
    pub digests: u64,
    pub inserted: u64,
    pub conflicts: u64,
    /// Lines skipped because they could not be decoded
    pub skipped: u64,
    pub commits: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

pub struct Pipeline {
    config: BuildConfig,
}

impl Pipeline {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the build to completion
    pub fn run(&self) -> std::result::Result<BuildReport, BuildError> {
        let mut stage = Stage::Init;

        match self.execute(&mut stage) {
            Ok(report) => Ok(report),
            Err(source) => {
                log::error!("Build aborted during {}: {}", stage, source);
                Err(BuildError { stage, source })
            }
        }
    }

    fn execute(&self, stage: &mut Stage) -> Result<BuildReport> {
        let stats = BuildStats::new();

        if !self.config.quiet {
            print_header("Opening table store...");
            print_info(&format!("Database: {:?}", self.config.database));
        }

        let mut store = TableStore::open(&self.config.database)?;
        let schema = store.init_schema()?;
        *stage = Stage::SchemaReady;

        let algorithms = algorithm::resolve(&self.config.selector)?;
        let reader = WordlistReader::with_options(
            &self.config.wordlist,
            self.config.line_endings,
            self.config.encoding,
        )?;
        *stage = Stage::Streaming;

        if !self.config.quiet {
            print_header("Building table...");
            print_info(&format!("Wordlist:   {:?} ({})", reader.path(), reader.encoding().name()));
            print_info(&format!("Algorithms: {}", join_names(&algorithms)));
        }

        let pb = if self.config.quiet {
            ProgressBar::hidden()
        } else {
            create_build_progress_bar(reader.size())
        };

        self.stream(reader, &algorithms, &mut store, &stats, &pb)?;
        pb.finish_with_message(format!("{} {}", progress_message(&stats), "done".green()));
        *stage = Stage::Finalizing;

        let commits = store.commit()?;
        *stage = Stage::Done;

        if !self.config.quiet {
            print_success(&format!("Table written to: {:?}", self.config.database));
            if stats.get_conflicts() > 0 {
                print_warning(&format!(
                    "{} hashes were already in the table and kept their existing word",
                    format_number(stats.get_conflicts())
                ));
            }
            print_summary(&stats, commits);
        }

        Ok(BuildReport {
            schema,
            algorithms,
            words: stats.get_words(),
            digests: stats.get_digests(),
            inserted: stats.get_inserted(),
            conflicts: stats.get_conflicts(),
            skipped: stats.get_skipped(),
            commits,
            bytes: stats.get_bytes(),
            elapsed: stats.elapsed(),
        })
    }

    fn stream(
        &self,
        mut reader: WordlistReader,
        algorithms: &[Algorithm],
        store: &mut TableStore,
        stats: &BuildStats,
        pb: &ProgressBar,
    ) -> Result<()> {
        while let Some(record) = reader.next() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_recoverable() => {
                    stats.add_skipped();
                    pb.suspend(|| log::warn!("Skipping {:?}: {}", reader.path(), e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            stats.add_word();
            let digests = compute_digests(&record.word, algorithms);
            stats.add_digests(digests.len() as u64);

            for (algorithm, hash) in &digests {
                let entry = RainbowEntry {
                    hash: hash.as_str(),
                    word: &record.word,
                };

                match store.insert(entry)? {
                    InsertOutcome::Inserted => stats.add_inserted(),
                    InsertOutcome::Conflict => {
                        stats.add_conflict();
                        pb.suspend(|| {
                            log::warn!(
                                "{:?} is already in the database as hash {} ({})",
                                record.word,
                                hash,
                                algorithm
                            )
                        });
                    }
                }
            }

            if let Some(every) = self.config.commit_every {
                if store.uncommitted() >= every {
                    store.checkpoint()?;
                }
            }

            if record.line % PROGRESS_INTERVAL == 0 {
                pb.set_position(reader.bytes_read());
                pb.set_message(progress_message(stats));
            }
        }

        stats.set_bytes(reader.bytes_read());
        pb.set_position(reader.bytes_read());
        Ok(())
    }
}

/// Digest one word with every selected algorithm, in selection order
///
/// Digests are computed in parallel when there is more than one algorithm;
/// the returned order is always the order of `algorithms`, so the first
/// algorithm to claim a hash is deterministic.
pub fn compute_digests(word: &str, algorithms: &[Algorithm]) -> Vec<(Algorithm, String)> {
    if algorithms.len() > 1 {
        algorithms
            .par_iter()
            .map(|&alg| (alg, hasher::digest(word, alg)))
            .collect()
    } else {
        algorithms
            .iter()
            .map(|&alg| (alg, hasher::digest(word, alg)))
            .collect()
    }
}

fn join_names(algorithms: &[Algorithm]) -> String {
    algorithms
        .iter()
        .map(|alg| alg.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a table from `config` in one call
pub fn build(config: BuildConfig) -> std::result::Result<BuildReport, BuildError> {
    Pipeline::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn wordlist(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    fn open_table(path: &std::path::Path) -> TableStore {
        let mut store = TableStore::open(path).unwrap();
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn test_duplicate_word_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"apple\nbanana\napple\n");

        let report = build(BuildConfig::new(&db, words.path(), "md5")).unwrap();

        assert_eq!(report.words, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.conflicts, 1);
        assert_eq!(report.schema, Schema::Created);

        let store = open_table(&db);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(
            store.word_for(&hasher::digest("apple", Algorithm::Md5)).unwrap().as_deref(),
            Some("apple")
        );
        assert_eq!(
            store.word_for(&hasher::digest("banana", Algorithm::Md5)).unwrap().as_deref(),
            Some("banana")
        );
    }

    #[test]
    fn test_all_algorithms_one_word() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"test\n");

        let report = build(BuildConfig::new(&db, words.path(), "all")).unwrap();

        assert_eq!(report.algorithms.len(), Algorithm::ALL.len());
        assert_eq!(report.inserted, Algorithm::ALL.len() as u64);
        assert_eq!(report.conflicts, 0);

        let store = open_table(&db);
        assert_eq!(store.len().unwrap(), Algorithm::ALL.len() as u64);
        for alg in Algorithm::ALL {
            let hash = hasher::digest("test", alg);
            assert_eq!(store.word_for(&hash).unwrap().as_deref(), Some("test"));
        }
    }

    #[test]
    fn test_distinct_words_all_inserted() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let content: String = (0..500).map(|i| format!("word{}\n", i)).collect();
        let words = wordlist(content.as_bytes());

        let report = build(BuildConfig::new(&db, words.path(), "sha256")).unwrap();

        assert_eq!(report.inserted, 500);
        assert_eq!(open_table(&db).len().unwrap(), 500);
    }

    #[test]
    fn test_rerun_augments_table() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let first = wordlist(b"apple\nbanana\n");
        let second = wordlist(b"cherry\ndate\nbanana\n");

        build(BuildConfig::new(&db, first.path(), "sha1")).unwrap();
        let report = build(BuildConfig::new(&db, second.path(), "sha1")).unwrap();

        assert_eq!(report.schema, Schema::Existing);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.conflicts, 1);

        let store = open_table(&db);
        assert_eq!(store.len().unwrap(), 4);
        assert_eq!(
            store.word_for(&hasher::digest("apple", Algorithm::Sha1)).unwrap().as_deref(),
            Some("apple")
        );
    }

    #[test]
    fn test_hashes_are_unique() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"a\nb\na\nc\nb\n");

        build(BuildConfig::new(&db, words.path(), "all")).unwrap();

        let conn = rusqlite::Connection::open(&db).unwrap();
        let duplicates: i64 = conn
            .query_row("SELECT COUNT(*) - COUNT(DISTINCT hash) FROM rainbow", [], |row| row.get(0))
            .unwrap();
        assert_eq!(duplicates, 0);
    }

    #[test]
    fn test_keep_line_endings() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"apple\n");

        let mut config = BuildConfig::new(&db, words.path(), "md5");
        config.line_endings = LineEndings::Keep;
        build(config).unwrap();

        let store = open_table(&db);
        assert_eq!(
            store.word_for(&hasher::digest("apple\n", Algorithm::Md5)).unwrap().as_deref(),
            Some("apple\n")
        );
        assert_eq!(store.word_for(&hasher::digest("apple", Algorithm::Md5)).unwrap(), None);
    }

    #[test]
    fn test_keep_mode_normalizes_crlf_and_keeps_blank_lines() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"banana\r\n\n");

        let mut config = BuildConfig::new(&db, words.path(), "md5");
        config.line_endings = LineEndings::Keep;
        let report = build(config).unwrap();

        assert_eq!(report.words, 2);
        assert_eq!(report.inserted, 2);

        let store = open_table(&db);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(
            store.word_for(&hasher::digest("banana\n", Algorithm::Md5)).unwrap().as_deref(),
            Some("banana\n")
        );
        assert_eq!(
            store.word_for(&hasher::digest("\n", Algorithm::Md5)).unwrap().as_deref(),
            Some("\n")
        );
        assert_eq!(store.word_for(&hasher::digest("banana\r\n", Algorithm::Md5)).unwrap(), None);
    }

    #[test]
    fn test_undecodable_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"apple\n\xC3\x28\nbanana\n");

        let report = build(BuildConfig::new(&db, words.path(), "md5")).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.inserted, 2);
    }

    #[test]
    fn test_periodic_commits() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let content: String = (0..10).map(|i| format!("w{}\n", i)).collect();
        let words = wordlist(content.as_bytes());

        let mut config = BuildConfig::new(&db, words.path(), "md5");
        config.commit_every = Some(3);
        let report = build(config).unwrap();

        // 3 checkpoints plus the final commit
        assert_eq!(report.commits, 4);
        assert_eq!(report.inserted, 10);
    }

    #[test]
    fn test_missing_wordlist_aborts() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");

        let err = build(BuildConfig::new(&db, dir.path().join("nope.txt"), "md5")).unwrap_err();

        assert_eq!(err.stage, Stage::SchemaReady);
        assert!(matches!(err.source, Error::SourceNotFound { .. }));
    }

    #[test]
    fn test_unknown_algorithm_aborts_before_streaming() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("rainbow.db");
        let words = wordlist(b"apple\n");

        let err = build(BuildConfig::new(&db, words.path(), "crc32")).unwrap_err();

        assert_eq!(err.stage, Stage::SchemaReady);
        assert!(matches!(err.source, Error::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_unopenable_store_aborts() {
        let dir = TempDir::new().unwrap();
        let words = wordlist(b"apple\n");
        let db = dir.path().join("missing").join("rainbow.db");

        let err = build(BuildConfig::new(&db, words.path(), "md5")).unwrap_err();

        assert_eq!(err.stage, Stage::Init);
        assert!(matches!(err.source, Error::StoreUnavailable { .. }));
    }

    #[test]
    fn test_compute_digests_keeps_order() {
        let digests = compute_digests("test", &Algorithm::ALL);
        let order: Vec<_> = digests.iter().map(|(alg, _)| *alg).collect();
        assert_eq!(order, Algorithm::ALL.to_vec());
    }
}
