//! Rainbow Table - digest → word lookup table builder
//!
//! Main entry point for the command-line application.

use clap::Parser;
use std::process;

use rainbow_table::algorithm::{self, supported_algorithms};
use rainbow_table::cli::Args;
use rainbow_table::pipeline::{BuildConfig, Pipeline};
use rainbow_table::progress::{print_banner, print_bullet, print_error, print_header, print_info};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    std::env::set_var("RUST_LOG", args.log_level());
    env_logger::init();

    // Configure thread pool
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Run the application
    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.list_algorithms {
        for alg in supported_algorithms() {
            println!("{}", alg);
        }
        return Ok(());
    }

    // Print banner unless quiet mode
    if !args.quiet {
        print_banner();
    }

    // Validate arguments before the database is touched
    validate_args(&args)?;

    let config = BuildConfig::from_args(&args)?;

    if !args.quiet && args.verbose {
        print_config(&args, &config);
    }

    Pipeline::new(config).run()?;

    Ok(())
}

/// Validate command-line arguments
fn validate_args(args: &Args) -> anyhow::Result<()> {
    if !args.wordlist.is_file() {
        anyhow::bail!("Wordlist does not exist: {:?}", args.wordlist);
    }

    algorithm::resolve(&args.hash_type)?;

    if args.commit_every == Some(0) {
        anyhow::bail!("--commit-every must be at least 1");
    }

    Ok(())
}

/// Print configuration summary
fn print_config(args: &Args, config: &BuildConfig) {
    print_header("Configuration");

    print_info(&format!("Database:     {:?}", config.database));
    print_info(&format!("Wordlist:     {:?}", config.wordlist));
    print_info(&format!("Type:         {}", config.selector));
    print_info(&format!("Line endings: {:?}", config.line_endings));
    print_info(&format!("Encoding:     {}", args.encoding));
    match config.commit_every {
        Some(n) => print_info(&format!("Commit every: {} rows", n)),
        None => print_info("Commit every: end of run"),
    }
    print_info(&format!("Threads:      {}", args.threads.unwrap_or_else(num_cpus::get)));

    if let Ok(algorithms) = algorithm::resolve(&config.selector) {
        for alg in algorithms {
            print_bullet(&format!("{} ({} hex chars)", alg, alg.hex_len()));
        }
    }
}
