use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::Parser;
use tracing::{debug, Level};

use gr8s_prepare::core::{
    guess_index_path, prepare_document, print_error_message, print_info_message,
    print_success_message, read_index, write_prepared, PrepareError, PrepareOptions,
};
use gr8s_prepare::env::{generate_env_docs, EnvConfig};
use gr8s_prepare::verify::{pretty_print_diff, ReportStyle};

#[derive(Parser)]
#[command(name = "gr8s-prepare-index-html", version)]
#[command(about = "A command to prepare your html code to use gr8s server. For more details, check:
    https://gr8s-server.codoma.tech")]
#[command(after_help = generate_env_docs())]
struct Cli {
    /// The path of the site index.html. If not provided, it will be guessed
    #[arg(short = 'f', long = "index", value_name = "PATH")]
    index: Option<PathBuf>,

    /// Add JS code to remove pre-rendered content on page load
    #[arg(short = 'c', long = "js-remove-contents", alias = "js_remove_contents")]
    js_remove_contents: bool,

    /// Add JS code to remove pre-rendered links on page load
    #[arg(short = 'l', long = "js-remove-links", alias = "js_remove_links")]
    js_remove_links: bool,

    /// Switch on minifying the output html
    #[arg(short = 'm', long = "minify")]
    minify: bool,

    /// Switch on verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            print_error_message(&error.to_string());
            process::exit(1);
        }
    };

    init_logging(&config, cli.verbose);

    if let Err(error) = run(&cli, &config) {
        print_error_message(&error.to_string());
        process::exit(1);
    }
}

fn init_logging(config: &EnvConfig, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.log_level).unwrap_or(Level::WARN)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(!config.no_color && atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: &EnvConfig) -> Result<(), PrepareError> {
    let index = match &cli.index {
        Some(index) => index.clone(),
        None => {
            print_info_message("No index.html path provided. Trying to guess ...");
            let guess = guess_index_path(Path::new(".")).ok_or(PrepareError::IndexNotFound)?;
            print_success_message(&format!(
                "Found one in {}, you (probably) use {}",
                guess.path.display(),
                guess.framework
            ));
            guess.path
        }
    };

    let options = PrepareOptions {
        remove_prerendered_content: cli.js_remove_contents,
        remove_prerendered_links: cli.js_remove_links,
        minify: cli.minify,
        diff_timeout: config.diff_timeout,
    };
    debug!(?options, index = %index.display(), "preparing");

    let original = read_index(&index)?;
    let prepared = prepare_document(&original, &options)?;

    if cli.verbose {
        let style = if !config.no_color && atty::is(atty::Stream::Stdout) {
            ReportStyle::Ansi
        } else {
            ReportStyle::Plain
        };
        let report = pretty_print_diff(&prepared.changes, style, config.diff_context);

        print_info_message("Enriched index.html. Here is the diff:");
        println!("\t> {}", report.replace('\n', "\n\t> "));
    }

    let backup = write_prepared(&index, &original, &prepared.html)?;

    print_info_message(&format!(
        "The original source was backed up in {}",
        backup.display()
    ));
    print_success_message(&format!(
        "Your gr8s-enabled html file is in {}.",
        index.display()
    ));

    Ok(())
}
