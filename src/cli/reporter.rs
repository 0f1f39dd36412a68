// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use colored::*;
use std::time::Duration;

/// Timings and counts of one `render` run
#[derive(Debug, Clone)]
pub struct RenderSummary<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub node: &'a str,
    pub vertices: usize,
    pub triangles: usize,
    pub computed_nodes: usize,
    pub render_time: Duration,
    pub export_time: Duration,
}

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a finished render
    pub fn report_render(summary: &RenderSummary) {
        println!("\n{}", "━".repeat(60).bright_black());
        println!("{} {}", "Rendered:".bold(), summary.input.cyan());
        println!("{}", "━".repeat(60).bright_black());
        println!("  {} {}", "Output node:".bright_black(), summary.node.cyan());
        println!(
            "  {} {}",
            "Vertices:".bright_black(),
            summary.vertices.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Triangles:".bright_black(),
            summary.triangles.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Nodes computed:".bright_black(),
            summary.computed_nodes.to_string().cyan()
        );
        println!(
            "  {} {} | {} {}",
            "Evaluate:".bright_black(),
            Self::format_duration(summary.render_time).yellow(),
            "Export:".bright_black(),
            Self::format_duration(summary.export_time).yellow()
        );
        println!("  {} {}", "STL:".bright_black(), summary.output.cyan());
        println!("{}", "━".repeat(60).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
