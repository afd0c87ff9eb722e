//! Terminal display for linkprobe runs.
//!
//! Plain mode prints one line per window and flat count sections; `--pretty`
//! adds a header, colored section rules and a closing summary bar. Uses only
//! the `console` crate.

use console::{pad_str, style, Alignment, Style};
use linkprobe_lib::{ProbeConfig, ProbeStatus, RunReport, Summary, WindowReport};

const SUBDOMAIN_WIDTH: usize = 14;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print the run header. Plain mode gets a single line.
pub fn print_header(config: &ProbeConfig, pretty: bool) {
    if !pretty {
        println!(
            "Probing {} per window for {} window{} (timeout {})",
            count_noun(config.requests_per_window, "subdomain"),
            config.windows,
            plural(config.windows),
            format_duration(config.timeout),
        );
        return;
    }

    println!(
        "{} {} {}",
        style("linkprobe").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- {} request{} over {} window{}",
            config.total_requests(),
            plural(config.total_requests()),
            config.windows,
            plural(config.windows),
        ))
        .dim(),
    );

    let meta = [
        format!("Per window: {}", config.requests_per_window),
        format!("Timeout: {}", format_duration(config.timeout)),
        format!("Window: {}", format_duration(config.window_duration)),
    ];
    println!("{}", style(meta.join(" | ")).dim());
    println!("{}", style(&config.target).dim());
    println!();
}

// ── Window progress ──────────────────────────────────────────────────────────

/// Print the completion line for one window.
pub fn print_window(window: &WindowReport, total_windows: usize, pretty: bool) {
    let line = format_window_line(window, total_windows);
    if !pretty {
        println!("{}", line);
        return;
    }

    let errors = window.error_count();
    let marker = if errors == 0 {
        style("✓").green()
    } else {
        style("!").yellow()
    };
    println!("  {} {}", marker, style(line).dim());
}

fn format_window_line(window: &WindowReport, total_windows: usize) -> String {
    let errors = window.error_count();
    format!(
        "Window {}/{} completed in {:.2}s ({}, {})",
        window.index + 1,
        total_windows,
        window.elapsed.as_secs_f64(),
        count_noun(window.results.len() - errors, "response"),
        count_noun(errors, "error"),
    )
}

// ── Counts ───────────────────────────────────────────────────────────────────

/// Print status counts, category counts and the per-subdomain log.
pub fn print_report(summary: &Summary, pretty: bool) {
    if pretty {
        println!();
    }

    let statuses: Vec<(String, usize)> = summary
        .statuses
        .sorted()
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();
    print_counts("Status counts", &statuses, pretty);

    let categories: Vec<(String, usize)> = summary
        .categories
        .sorted()
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    print_counts("Category counts", &categories, pretty);

    print_section_title("Subdomains", summary.log.len(), pretty);
    for entry in summary.log.iter() {
        let padded = pad_str(
            &entry.subdomain,
            SUBDOMAIN_WIDTH,
            Alignment::Left,
            Some(".."),
        );
        if pretty {
            println!(
                "    {}  {}",
                style(&padded).white(),
                status_style(&entry.status.to_string()).apply_to(entry.status),
            );
        } else {
            println!("  {}  {}", padded, entry.status);
        }
    }
    if pretty {
        println!();
    } else {
        println!("Total requests: {}", summary.total());
    }
}

fn print_counts(title: &str, rows: &[(String, usize)], pretty: bool) {
    print_section_title(title, rows.len(), pretty);
    for (key, count) in rows {
        if pretty {
            println!(
                "    {}  {}",
                status_style(key).apply_to(pad_str(key, 8, Alignment::Left, None)),
                count,
            );
        } else {
            println!("  {}", format_count_line(key, *count));
        }
    }
    if pretty {
        println!();
    }
}

fn print_section_title(title: &str, len: usize, pretty: bool) {
    if pretty {
        let heading = format!("── {} ({}) ", title, len);
        let rule = 52usize.saturating_sub(heading.chars().count());
        println!(
            "  {} {}",
            style(heading).cyan().bold(),
            style("─".repeat(rule)).cyan().dim(),
        );
    } else {
        println!("{}:", title);
    }
}

fn format_count_line(key: &str, count: usize) -> String {
    format!("{}: {}", key, count)
}

/// Color for a status code or category key such as `404` or `4xx`.
fn status_style(key: &str) -> Style {
    match key.chars().next() {
        Some('2') => Style::new().green(),
        Some('3') => Style::new().cyan(),
        Some('4') => Style::new().yellow(),
        Some('5') => Style::new().red(),
        _ if key == ProbeStatus::ERROR_KEY => Style::new().red().bold(),
        _ => Style::new(),
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar.
pub fn print_summary(report: &RunReport) {
    let summary = &report.summary;
    let errors = summary.error_count();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} in {:.1}s  {}  {}  {}  {}",
        style(count_noun(summary.total(), "request")).bold(),
        report.total_duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} answered", summary.total() - errors)).green(),
        style("|").dim(),
        style(count_noun(errors, "error")).red(),
    );
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn count_noun(n: usize, noun: &str) -> String {
    format!("{} {}{}", n, noun, plural(n))
}

/// Render a duration the way it is written on the command line.
fn format_duration(duration: std::time::Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}
