//! Terminal output: progress lines, banners and the URL summary.

use colored::Colorize;

use forgesync_sync::{ProgressEvent, ProgressSink, RepositoryUrl};

const RULE: &str = "================================================";

/// Prints orchestrator progress to stdout as it happens.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RepositoryStarted { repo } => {
                println!("\n{RULE}");
                println!("Processing: {}", repo.bold());
            }
            ProgressEvent::Step { message, .. } => println!("  {} {message}", "→".cyan()),
            ProgressEvent::Done { message, .. } => println!("  {} {message}", "✓".green()),
            ProgressEvent::Failed { message, .. } => println!("  {} {message}", "✗".red()),
            ProgressEvent::Info { message } => println!("  {} {message}", "ℹ".blue()),
        }
    }
}

pub fn banner(lines: &[String]) {
    println!("{RULE}");
    for line in lines {
        println!("{line}");
    }
    println!("{RULE}");
}

pub fn success(title: &str) {
    println!("\n{RULE}");
    println!("{} {title}", "✓".green());
    println!("{RULE}");
}

pub fn print_urls(urls: &[RepositoryUrl]) {
    println!("\nRepository URLs:");
    let width = urls.iter().map(|u| u.provider.len()).max().unwrap_or(0) + 1;
    for url in urls {
        println!("  {:<width$} {}", format!("{}:", url.provider), url.url);
    }
}
