//! Progress display module
//!
//! Styled terminal output, the wordlist progress bar, and build counters.

use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                                                                              ║
║   ██████╗  █████╗ ██╗███╗   ██╗██████╗  ██████╗ ██╗    ██╗                   ║
║   ██╔══██╗██╔══██╗██║████╗  ██║██╔══██╗██╔═══██╗██║    ██║                   ║
║   ██████╔╝███████║██║██╔██╗ ██║██████╔╝██║   ██║██║ █╗ ██║                   ║
║   ██╔══██╗██╔══██║██║██║╚██╗██║██╔══██╗██║   ██║██║███╗██║                   ║
║   ██║  ██║██║  ██║██║██║ ╚████║██████╔╝╚██████╔╝╚███╔███╔╝                   ║
║   ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝╚═╝  ╚═══╝╚═════╝  ╚═════╝  ╚══╝╚══╝                    ║
║                                                                              ║
║                      Digest → Word Lookup Table Builder                      ║
║                                                              v1.0.0          ║
╚══════════════════════════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner.green());
}

/// Marker glyphs and colors for one kind of status line
#[derive(Clone, Copy)]
enum Tone {
    Info,
    Success,
    Warning,
    Error,
    Bullet,
}

impl Tone {
    fn marker(self) -> ColoredString {
        match self {
            Tone::Info => "[*]".cyan(),
            Tone::Success => "[+]".green().bold(),
            Tone::Warning => "[!]".yellow().bold(),
            Tone::Error => "[x]".red().bold(),
            Tone::Bullet => " - ".green(),
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            Tone::Info | Tone::Bullet => text.normal(),
            Tone::Success => text.green(),
            Tone::Warning => text.yellow(),
            Tone::Error => text.red(),
        }
    }
}

fn status_line(tone: Tone, text: &str) -> String {
    format!("  {} {}", tone.marker(), tone.paint(text))
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "::".green().bold(), text.bold());
}

pub fn print_info(text: &str) {
    println!("{}", status_line(Tone::Info, text));
}

pub fn print_success(text: &str) {
    println!("{}", status_line(Tone::Success, text));
}

pub fn print_warning(text: &str) {
    println!("{}", status_line(Tone::Warning, text));
}

/// Errors go to stderr so they survive a redirected stdout
pub fn print_error(text: &str) {
    eprintln!("{}", status_line(Tone::Error, text));
}

pub fn print_bullet(text: &str) {
    println!("{}", status_line(Tone::Bullet, text));
}

const BUILD_BAR_TEMPLATE: &str =
    "{spinner:.green} {elapsed_precise} |{bar:32.green/black}| {bytes}/{total_bytes} eta {eta} {msg}";

/// Progress bar over the wordlist's bytes, with row counts in the message
pub fn create_build_progress_bar(total_bytes: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(BUILD_BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let pb = ProgressBar::new(total_bytes).with_style(style);
    pb.set_message(progress_message(&BuildStats::new()));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Running totals shown next to the build progress bar
pub fn progress_message(stats: &BuildStats) -> String {
    let conflicts = stats.get_conflicts();
    let rows = format!("{} rows", format_number(stats.get_inserted()));

    if conflicts == 0 {
        rows
    } else {
        format!("{} | {} conflicts", rows, format_number(conflicts))
    }
}

/// Counters for a single build
#[derive(Debug)]
pub struct BuildStats {
    pub words: AtomicU64,
    pub digests: AtomicU64,
    pub inserted: AtomicU64,
    pub conflicts: AtomicU64,
    pub skipped: AtomicU64,
    pub bytes: AtomicU64,
    pub start_time: Instant,
}

impl BuildStats {
    pub fn new() -> Self {
        Self {
            words: AtomicU64::new(0),
            digests: AtomicU64::new(0),
            inserted: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn add_word(&self) {
        self.words.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_digests(&self, count: u64) {
        self.digests.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_inserted(&self) {
        self.inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_bytes(&self, bytes: u64) {
        self.bytes.store(bytes, Ordering::Relaxed);
    }

    pub fn get_words(&self) -> u64 {
        self.words.load(Ordering::Relaxed)
    }

    pub fn get_digests(&self) -> u64 {
        self.digests.load(Ordering::Relaxed)
    }

    pub fn get_inserted(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }

    pub fn get_conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    pub fn get_skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn get_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn digests_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_digests() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for BuildStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Print final statistics for a finished build
pub fn print_summary(stats: &BuildStats, commits: u64) {
    let mut rows = vec![
        ("wordlist", ByteSize(stats.get_bytes()).to_string()),
        ("words", format_number(stats.get_words())),
        ("digests", format_number(stats.get_digests())),
        ("inserted", format_number(stats.get_inserted())),
        ("conflicts", format_number(stats.get_conflicts())),
    ];
    if stats.get_skipped() > 0 {
        rows.push(("skipped", format_number(stats.get_skipped())));
    }
    rows.push(("commits", commits.to_string()));
    rows.push(("elapsed", format_duration(stats.elapsed())));
    rows.push(("rate", format!("{:.0} digests/s", stats.digests_per_second())));

    let rule = "-".repeat(44);
    println!("\n{}", rule.dimmed());
    for (label, value) in rows {
        let label = format!("{:>10}", label);
        match label.trim_start() {
            "inserted" => println!("  {}  {}", label.green().bold(), value.green().bold()),
            "conflicts" | "skipped" => println!("  {}  {}", label.yellow(), value),
            _ => println!("  {}  {}", label.green(), value),
        }
    }
    println!("{}", rule.dimmed());
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        r => r,
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    out.push_str(&digits[..lead]);
    for group in digits.as_bytes()[lead..].chunks(3) {
        out.push(',');
        out.extend(group.iter().map(|&b| b as char));
    }
    out
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
