use clap::{Parser, Subcommand};
use gz_bundle::config::{self, BundleConfig};
use gz_bundle::output;
use gz_bundle::pipeline::{self, Outcome, PipelineError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gz-bundle")]
#[command(about = "Minify and inline a page's CSS and JS, then gzip it into one file")]
#[command(long_about = "\
Minify and inline a page's CSS and JS, then gzip it into one file

The artifact is written to <DEST>/<html file name>.gz, keeping the original
extension (index.html → index.html.gz). Nothing is written if any step fails.

  combine   index.html + style.css + app.js → dist/index.html.gz
            <link rel=\"stylesheet\"> and <script src> are removed; the
            minified CSS goes at the end of <head>, the JS at the end of <body>.
  html      index.html (CSS/JS already inline) → dist/index.html.gz

Run 'gz-bundle gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (TOML). Defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the run report as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log more detail to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inline a CSS and a JS file into an HTML page and gzip the result
    Combine {
        /// HTML page
        #[arg(long)]
        html: PathBuf,
        /// Stylesheet to inline into <head>
        #[arg(long)]
        css: PathBuf,
        /// Script to inline at the end of <body>
        #[arg(long)]
        js: PathBuf,
        /// Destination directory (must exist)
        #[arg(long)]
        dest: PathBuf,
    },
    /// Minify an HTML page that already inlines its CSS and JS, and gzip it
    Html {
        /// HTML page
        #[arg(long)]
        html: PathBuf,
        /// Destination directory (must exist)
        #[arg(long)]
        dest: PathBuf,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return ExitCode::SUCCESS;
        }
        Command::Combine {
            html,
            css,
            js,
            dest,
        } => match load_config(cli.config.as_deref()) {
            Ok(config) => pipeline::run_combine(&html, &css, &js, &dest, &config),
            Err(outcome) => outcome,
        },
        Command::Html { html, dest } => match load_config(cli.config.as_deref()) {
            Ok(config) => pipeline::run_html_only(&html, &dest, &config),
            Err(outcome) => outcome,
        },
    };

    report(&outcome, cli.json)
}

/// Load the config, turning a failure into the same kind of result a run gives.
fn load_config(path: Option<&Path>) -> Result<BundleConfig, Outcome> {
    config::load_config(path)
        .map_err(|e| Outcome::Failure(PipelineError::from(e).user_message()))
}

fn report(outcome: &Outcome, json: bool) -> ExitCode {
    match outcome {
        Outcome::Success(report) if json => {
            if let Err(e) = output::print_report_json(report) {
                eprintln!("Unexpected error: {e}");
                return ExitCode::FAILURE;
            }
        }
        _ => output::print_outcome(outcome),
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Install a stderr subscriber whose level comes from `-v` alone.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::new(format!("gz_bundle={level}")))
        .init();
}
