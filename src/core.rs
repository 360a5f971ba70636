use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::env::output::NoColor;
use crate::env::EnvVar;
use crate::minify::minify_document;
use crate::parsers::html::{html_to_dom, walk, HtmlScanner, ScannerOptions};
use crate::verify::{compute_changes, ChangeStats, Diff, DEFAULT_DIFF_TIMEOUT};

/// Raised by the transformation engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// The title already holds the page title directive
    #[error("It seems your HTML was already processed. Please use this program on raw unprocessed html")]
    AlreadyProcessed,
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Error processing the file:\n{0}")]
    Processing(#[from] ProcessingError),
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to find index.html, please specify it explicitly")]
    IndexNotFound,
    #[error("Failed to minify the output: {0}")]
    Minify(String),
}

impl PrepareError {
    fn io(path: &Path, source: io::Error) -> Self {
        PrepareError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Configuration of one preparation run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrepareOptions {
    pub remove_prerendered_content: bool,
    pub remove_prerendered_links: bool,
    pub minify: bool,
    /// Wall-clock budget of the change diff
    pub diff_timeout: Duration,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            remove_prerendered_content: false,
            remove_prerendered_links: false,
            minify: false,
            diff_timeout: DEFAULT_DIFF_TIMEOUT,
        }
    }
}

impl PrepareOptions {
    fn scanner_options(&self) -> ScannerOptions {
        ScannerOptions {
            remove_prerendered_content: self.remove_prerendered_content,
            remove_prerendered_links: self.remove_prerendered_links,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedDocument {
    /// The template, ready to be written in place of the original
    pub html: String,
    /// Normalized original against the unminified template
    pub changes: Vec<Diff>,
}

/// Below this share of surviving original text the run is reported as suspicious
const RETAINED_RATIO_WARNING: f64 = 0.5;

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_BLUE: &str = "\x1b[1;34m";
const ANSI_COLOR_GREEN: &str = "\x1b[1;32m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Build output locations probed when no index path is given
const KNOWN_INDEX_LOCATIONS: [(&str, &str); 2] = [
    ("next.js", "out/index.html"),
    ("nuxt.js", "dist/index.html"),
];

/// Finds the `<!DOCTYPE html>` declaration the parser does not report
pub fn detect_doctype(raw: &str) -> Option<&str> {
    static DOCTYPE: OnceLock<Option<Regex>> = OnceLock::new();
    let doctype = DOCTYPE
        .get_or_init(|| Regex::new(r"(?im)^<!\s*doctype\s+html\s*>").ok())
        .as_ref()?;

    doctype.find(raw).map(|found| found.as_str())
}

/// Turns a rendered page into a gr8s template
///
/// Nothing is written to disk. `changes` always describes the unminified
/// output so that it stays readable.
pub fn prepare_document(
    raw: &str,
    options: &PrepareOptions,
) -> Result<PreparedDocument, PrepareError> {
    let dom = html_to_dom(raw.as_bytes(), "utf-8");

    let mut scanner = HtmlScanner::new(options.scanner_options());
    walk(&dom.document, &mut scanner)?;
    debug!(fragments = scanner.lines().len(), "document scanned");

    let mut transformed = scanner.into_output();
    if let Some(doctype) = detect_doctype(raw) {
        transformed = format!("{doctype}\n{transformed}");
    }

    let changes = compute_changes(raw, &transformed, options.diff_timeout);
    let stats = ChangeStats::from_diffs(&changes);
    debug!(
        unchanged = stats.unchanged,
        inserted = stats.inserted,
        deleted = stats.deleted,
        "changes computed"
    );
    if stats.retained_ratio() < RETAINED_RATIO_WARNING {
        warn!(
            "only {:.0}% of the original document survived, check the diff with --verbose",
            stats.retained_ratio() * 100.0
        );
    }

    let html = if options.minify {
        minify_document(&transformed)?
    } else {
        transformed
    };

    Ok(PreparedDocument { html, changes })
}

/// An index found in a known build output directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessedIndex {
    pub path: PathBuf,
    /// Framework that usually builds into that directory
    pub framework: &'static str,
}

pub fn guess_index_path(root: &Path) -> Option<GuessedIndex> {
    KNOWN_INDEX_LOCATIONS
        .iter()
        .map(|&(framework, location)| GuessedIndex {
            path: root.join(location),
            framework,
        })
        .find(|guess| guess.path.is_file())
}

/// Reads an index as UTF-8, dropping a byte order mark
pub fn read_index(path: &Path) -> Result<String, PrepareError> {
    let data = fs::read(path).map_err(|error| PrepareError::io(path, error))?;
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&data);
    if had_errors {
        warn!("{} is not valid UTF-8, invalid bytes were replaced", path.display());
    }

    Ok(text.into_owned())
}

pub fn backup_path(index: &Path) -> PathBuf {
    let mut backup = index.as_os_str().to_os_string();
    backup.push(".bak");
    PathBuf::from(backup)
}

/// Backs the original up next to the index, then overwrites the index
///
/// Returns the backup location. The index is left alone when the backup
/// cannot be written.
pub fn write_prepared(index: &Path, original: &str, html: &str) -> Result<PathBuf, PrepareError> {
    let backup = backup_path(index);

    fs::write(&backup, original).map_err(|error| PrepareError::io(&backup, error))?;
    info!("original backed up to {}", backup.display());

    fs::write(index, html).map_err(|error| PrepareError::io(index, error))?;
    info!("template written to {}", index.display());

    Ok(backup)
}

/// Wraps `msg` in `color` unless colors are off
fn paint(msg: &str, color: &str, colored: bool) -> String {
    if colored {
        format!("{color}{msg}{ANSI_COLOR_RESET}")
    } else {
        msg.to_string()
    }
}

/// Colors only go to terminals, and never with `NO_COLOR` set
fn use_color(stream: atty::Stream) -> bool {
    !NoColor::get_or_default(false) && atty::is(stream)
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{}", paint(msg, ANSI_COLOR_RED, use_color(atty::Stream::Stderr)));
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{}", paint(msg, ANSI_COLOR_BLUE, use_color(atty::Stream::Stdout)));
}

pub fn print_success_message(msg: &str) {
    println!("{}", paint(msg, ANSI_COLOR_GREEN, use_color(atty::Stream::Stdout)));
}
