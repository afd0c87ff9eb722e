//! Linkprobe CLI Application
//!
//! Sends bursts of concurrent GET requests to randomly generated subdomains,
//! one burst per window, and prints how the response statuses break down.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use linkprobe_lib::{
    build_probe_url, generate_batch, parse_duration_string, validate_target, BatchDispatcher,
    FileConfig, ProbeConfig, RunReport, Summary,
};
use serde::Serialize;
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for linkprobe
#[derive(Parser, Debug)]
#[command(name = "linkprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Probe random page.link subdomains in rate-limited bursts")]
#[command(
    long_about = "Probe random page.link subdomains in rate-limited bursts.\n\nEach window sends a burst of concurrent GET requests for the apple-app-site-association file, waits for all of them, and pads the window to one second. Response statuses are tallied by code and by class."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Requests sent together in each window (default: 5)
    #[arg(short = 'r', long = "requests", value_name = "N", help_heading = "Load")]
    pub requests: Option<usize>,

    /// Number of windows to run (default: 3)
    #[arg(short = 'w', long = "windows", value_name = "N", help_heading = "Load")]
    pub windows: Option<usize>,

    /// Per-request timeout, e.g. 5s, 500ms (default: 5s)
    #[arg(short = 't', long = "timeout", value_name = "DURATION", help_heading = "Load")]
    pub timeout: Option<String>,

    /// Minimum window length, e.g. 1s (default: 1s)
    #[arg(long = "window", value_name = "DURATION", help_heading = "Load")]
    pub window: Option<String>,

    /// URL template; {subdomain} is replaced for every request
    #[arg(long = "target", value_name = "URL", help_heading = "Target")]
    pub target: Option<String>,

    /// Print the URLs of one window without sending anything
    #[arg(long = "dry-run", help_heading = "Target")]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Enable grouped, colored output with section headers
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Use a specific config file
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show per-request debug logging
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// How the final report is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum OutputFormat {
    Text,
    Pretty,
    Json,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);

    if let Err(e) = run_probe(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber; stdout is reserved for the report.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "linkprobe={level},linkprobe_lib={level}"
        )))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.requests == Some(0) {
        return Err("Requests per window must be at least 1".to_string());
    }

    if args.windows == Some(0) {
        return Err("Number of windows must be at least 1".to_string());
    }

    if let Some(timeout) = &args.timeout {
        match parse_duration_string(timeout) {
            Some(d) if !d.is_zero() => {}
            _ => {
                return Err(format!(
                    "Invalid timeout '{}'. Use format like '5s', '500ms', '2m'",
                    timeout
                ))
            }
        }
    }

    if let Some(window) = &args.window {
        if parse_duration_string(window).is_none() {
            return Err(format!(
                "Invalid window '{}'. Use format like '1s', '500ms'",
                window
            ));
        }
    }

    if let Some(target) = &args.target {
        validate_target(target).map_err(|e| e.to_string())?;
    }

    if args.json && args.pretty {
        return Err("Cannot specify both --json and --pretty".to_string());
    }

    Ok(())
}

/// Main probing logic
async fn run_probe(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, format) = build_config(&args)?;

    if args.dry_run {
        return print_dry_run(&config, format);
    }

    let dispatcher = BatchDispatcher::new(config)?;

    let report = match format {
        OutputFormat::Json => dispatcher.run().await,
        OutputFormat::Text | OutputFormat::Pretty => {
            let pretty = format == OutputFormat::Pretty;
            ui::print_header(dispatcher.config(), pretty);
            let total_windows = dispatcher.config().windows;
            dispatcher
                .run_with_progress(|window| ui::print_window(window, total_windows, pretty))
                .await
        }
    };

    match format {
        OutputFormat::Json => display_json_report(dispatcher.config(), &report)?,
        OutputFormat::Text => ui::print_report(&report.summary, false),
        OutputFormat::Pretty => {
            ui::print_report(&report.summary, true);
            ui::print_summary(&report);
        }
    }

    Ok(())
}

/// Build ProbeConfig and the output format from defaults, config file and CLI.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Config file given with --config
/// 3. Built-in defaults
fn build_config(args: &Args) -> Result<(ProbeConfig, OutputFormat), Box<dyn std::error::Error>> {
    let mut config = ProbeConfig::default();
    let mut json = args.json;
    let mut pretty = args.pretty;

    if let Some(path) = &args.config {
        tracing::info!(path = %path, "using config file");
        let file_config = FileConfig::load(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
        config = file_config.apply_to(config);

        // CLI output flags win; the file only fills in when none were given.
        if let Some(output) = &file_config.output {
            if !args.json && !args.pretty {
                json = output.json.unwrap_or(false);
                pretty = !json && output.pretty.unwrap_or(false);
            }
        }
    }

    config = apply_cli_args_to_config(config, args);

    let format = if json {
        OutputFormat::Json
    } else if pretty {
        OutputFormat::Pretty
    } else {
        OutputFormat::Text
    };

    Ok((config, format))
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(mut config: ProbeConfig, args: &Args) -> ProbeConfig {
    if let Some(requests) = args.requests {
        config = config.with_requests_per_window(requests);
    }
    if let Some(windows) = args.windows {
        config = config.with_windows(windows);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_duration_string) {
        config = config.with_timeout(timeout);
    }
    if let Some(window) = args.window.as_deref().and_then(parse_duration_string) {
        config = config.with_window_duration(window);
    }
    if let Some(target) = &args.target {
        config = config.with_target(target.trim());
    }
    config
}

/// Print the URLs one window would request.
fn print_dry_run(
    config: &ProbeConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let urls: Vec<String> = generate_batch(config.requests_per_window)
        .iter()
        .map(|subdomain| build_probe_url(&config.target, subdomain))
        .collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&urls)?);
    } else {
        for url in &urls {
            println!("{}", url);
        }
    }

    eprintln!(
        "{} requests per window x {} windows would be sent",
        config.requests_per_window, config.windows
    );
    Ok(())
}

#[derive(Serialize)]
struct JsonWindow {
    index: usize,
    elapsed_ms: u64,
    padding_ms: u64,
    responses: usize,
    errors: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    requests_per_window: usize,
    windows: usize,
    timeout_ms: u64,
    target: &'a str,
    duration_ms: u64,
    window_reports: Vec<JsonWindow>,
    summary: &'a Summary,
}

fn json_report<'a>(config: &'a ProbeConfig, report: &'a RunReport) -> JsonReport<'a> {
    JsonReport {
        requests_per_window: config.requests_per_window,
        windows: config.windows,
        timeout_ms: config.timeout.as_millis() as u64,
        target: &config.target,
        duration_ms: report.total_duration.as_millis() as u64,
        window_reports: report
            .windows
            .iter()
            .map(|w| JsonWindow {
                index: w.index,
                elapsed_ms: w.elapsed.as_millis() as u64,
                padding_ms: w.padding.as_millis() as u64,
                responses: w.results.len() - w.error_count(),
                errors: w.error_count(),
            })
            .collect(),
        summary: &report.summary,
    }
}

/// Display results in JSON format
fn display_json_report(
    config: &ProbeConfig,
    report: &RunReport,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&json_report(config, report))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkprobe_lib::{summarize, ProbeResult, WindowReport};
    use std::io::Write;
    use std::time::Duration;

    fn create_test_args() -> Args {
        Args {
            requests: None,
            windows: None,
            timeout: None,
            window: None,
            target: None,
            dry_run: false,
            json: false,
            pretty: false,
            config: None,
            debug: false,
            verbose: false,
        }
    }

    #[test]
    fn test_validate_args_defaults_ok() {
        assert!(validate_args(&create_test_args()).is_ok());
    }

    #[test]
    fn test_validate_args_rejects_bad_counts() {
        let mut args = create_test_args();
        args.requests = Some(0);
        assert!(validate_args(&args).is_err());

        args.requests = Some(250);
        assert!(validate_args(&args).is_ok());

        let mut args = create_test_args();
        args.windows = Some(0);
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_bad_durations() {
        let mut args = create_test_args();
        args.timeout = Some("fast".to_string());
        assert!(validate_args(&args).is_err());

        args.timeout = Some("0s".to_string());
        assert!(validate_args(&args).is_err());

        args.timeout = Some("750ms".to_string());
        assert!(validate_args(&args).is_ok());

        let mut args = create_test_args();
        args.window = Some("later".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_bad_target() {
        let mut args = create_test_args();
        args.target = Some("https://page.link/static".to_string());
        let err = validate_args(&args).unwrap_err();
        assert!(err.contains("{subdomain}"));
    }

    #[test]
    fn test_validate_args_json_and_pretty_conflict() {
        let mut args = create_test_args();
        args.json = true;
        args.pretty = true;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_build_config_defaults() {
        let (config, format) = build_config(&create_test_args()).unwrap();
        assert_eq!(config.requests_per_window, 5);
        assert_eq!(config.windows, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_args_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[defaults]\nrequests_per_window = 9\nwindows = 7\ntimeout = \"2s\"\n\n[output]\njson = true"
        )
        .unwrap();

        let mut args = create_test_args();
        args.config = Some(file.path().to_string_lossy().to_string());
        args.windows = Some(2);

        let (config, format) = build_config(&args).unwrap();
        assert_eq!(config.requests_per_window, 9);
        assert_eq!(config.windows, 2);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(format, OutputFormat::Json);

        args.pretty = true;
        let (_, format) = build_config(&args).unwrap();
        assert_eq!(format, OutputFormat::Pretty);
    }

    #[test]
    fn test_build_config_missing_file() {
        let mut args = create_test_args();
        args.config = Some("/no/such/linkprobe.toml".to_string());
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_json_report_shape() {
        let results = vec![ProbeResult::success(404, "abcdef"), ProbeResult::error()];
        let report = RunReport {
            summary: summarize(&results),
            windows: vec![WindowReport {
                index: 0,
                elapsed: Duration::from_millis(250),
                padding: Duration::from_millis(750),
                results,
            }],
            total_duration: Duration::from_secs(1),
        };
        let config = ProbeConfig::default().with_windows(1).with_requests_per_window(2);

        let value = serde_json::to_value(json_report(&config, &report)).unwrap();
        assert_eq!(value["requests_per_window"], 2);
        assert_eq!(value["windows"], 1);
        assert_eq!(value["timeout_ms"], 5000);
        assert_eq!(value["window_reports"][0]["padding_ms"], 750);
        assert_eq!(value["window_reports"][0]["responses"], 1);
        assert_eq!(value["window_reports"][0]["errors"], 1);
        assert_eq!(value["summary"]["statuses"]["404"], 1);
        assert_eq!(value["summary"]["categories"]["Error"], 1);
        assert_eq!(value["summary"]["total"], 2);
    }
}
