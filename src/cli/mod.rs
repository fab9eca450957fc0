//! Fraud Shield CLI Module
//!
//! Command-line interface for scoring transaction files, inspecting data
//! and running the web front end.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::model::{load_classifier, probe_candidates, CandidateState, ModelConfig};
use crate::monitoring::PipelineMetrics;
use crate::preprocessing::Validator;
use crate::report::thousands;
use crate::schema;
use crate::scoring::{to_csv_bytes, ScoringEngine};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn rule(len: usize) -> String {
    "─".repeat(len)
}

fn line_box_top() {
    println!("  {}", dim(&format!("┌{}┐", rule(W - 1))));
}

fn line_box_bottom() {
    println!("  {}", dim(&format!("└{}┘", rule(W - 1))));
}

fn line_box_sep() {
    println!("  {}", dim(&format!("├{}┤", rule(W - 1))));
}

fn line_box(content: &str) {
    let pad = W.saturating_sub(strip_ansi(content).chars().count());
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let total = W.saturating_sub(strip_ansi(content).chars().count());
    let left = total / 2;
    println!(
        "  {}  {}{}{} {}",
        dim("│"),
        " ".repeat(left),
        content,
        " ".repeat(total - left),
        dim("│")
    );
}

fn line_box_empty() {
    line_box("");
}

/// Drop SGR color sequences so padding math sees only visible characters.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for esc in chars.by_ref() {
                if esc == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&rule(W - 2)));
}

fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to return"));
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fraud-shield")]
#[command(author = "Fraud Shield")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Credit card fraud detection web front end")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a transaction file with the loaded model
    Analyze {
        /// Input transactions file (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the scored table
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the text report
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Show data information and the validation verdict
    Info {
        /// Input data file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List model artifact candidates and their status
    Models,

    /// Start the web server
    Serve {
        /// Server port
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Server host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &PathBuf) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let df = match ext {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.clone()))?
            .finish()?,
        _ => anyhow::bail!("Unsupported file format: {} (expected .csv)", ext),
    };

    Ok(df)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_analyze(
    input: &PathBuf,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    section("Analyze");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(input)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Loading model");
    let model = load_classifier(&ModelConfig::default())?;
    step_done(&format!("'{}'", model.name()));

    let engine = ScoringEngine::new(model, Arc::new(PipelineMetrics::default()));

    step_run("Scoring");
    let start = Instant::now();
    let mut analysis = engine.analyze(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    let m = &analysis.metrics;
    println!();
    println!("  {:<16} {}", muted("Transactions"), thousands(m.total_transactions).white().bold());
    println!("  {:<16} {}", muted("Legitimate"), thousands(m.legitimate_count).white());
    println!("  {:<16} {}", muted("Fraudulent"), thousands(m.fraud_count).white());
    println!("  {:<16} {}", muted("Fraud rate"), format!("{:.2}%", m.fraud_rate).white());
    println!(
        "  {:<16} {} {}",
        muted("Risk level"),
        m.risk_level.as_str().white().bold(),
        m.risk_level.icon()
    );
    if let Some(p) = &m.probabilities {
        println!(
            "  {:<16} {}",
            muted("Avg probability"),
            format!("{:.3}", p.avg_fraud_probability).white()
        );
    }
    println!();

    for line in analysis.report.lines() {
        println!("  {}", dim(line));
    }

    if let Some(path) = output {
        step_run(&format!("Saving → {}", path.display()));
        let bytes = to_csv_bytes(&mut analysis.results)?;
        std::fs::write(path, bytes)?;
        step_done(&format!(
            "{} rows × {} cols",
            analysis.results.height(),
            analysis.results.width()
        ));
    }

    if let Some(path) = report_path {
        std::fs::write(path, &analysis.report)?;
        step_ok(&format!("Report written to {}", path.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_info(input: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(input)?;

    println!("  {:<12} {}", muted("File"), input.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    section("Validation");

    match Validator::default().validate(&df) {
        Ok(report) => step_ok(&format!(
            "{} ({} of {} canonical features, {:.0}% numeric)",
            report.message,
            report.matched_features,
            schema::CANONICAL_FEATURE_COUNT,
            report.numeric_ratio * 100.0
        )),
        Err(e) => println!("  {} {}", "✗".red(), e),
    }

    println!();
    Ok(())
}

pub fn cmd_models() -> anyhow::Result<()> {
    section("Model Artifacts");

    let config = ModelConfig::default();

    for candidate in probe_candidates(&config) {
        let path = candidate.path.display().to_string();
        match &candidate.state {
            CandidateState::Loaded { kind } => {
                println!("  {} {:<40} {}", ok("✓"), path, muted(kind));
            }
            CandidateState::Missing => {
                println!("  {} {:<40} {}", dim("·"), path, dim("missing"));
            }
            CandidateState::Invalid { reason } => {
                println!("  {} {:<40} {}", "✗".red(), path, reason.red());
            }
        }
    }

    println!();
    println!("  {}", dim("the first loadable artifact is used for scoring"));
    println!("  {}", dim("override candidates with FRAUD_SHIELD_MODELS=a.json,b.json"));
    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Fraud Shield".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI  ", &format!("http://{}:{}", host, port)));
    line_box(&kv("Analyze ", &format!("http://{}:{}/analyze", host, port)));
    line_box(&kv("API     ", &format!("http://{}:{}/api", host, port)));
    line_box(&kv("Health  ", &format!("http://{}:{}/api/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        ..Default::default()
    };

    run_server(config).await
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!();
    println!("       {}", "┏━╸┏━┓┏━┓╻ ╻╺┳┓   ┏━┓╻ ╻╻┏━╸╻  ╺┳┓".truecolor(120, 170, 255));
    println!("       {}", "┣╸ ┣┳┛┣━┫┃ ┃ ┃┃╺━╸┗━┓┣━┫┃┣╸ ┃   ┃┃".truecolor(100, 150, 240));
    println!("       {}", "╹  ╹┗╸╹ ╹┗━┛╺┻┛   ┗━┛╹ ╹╹┗━╸┗━╸╺┻┛".truecolor(80, 130, 220));
    println!();
    println!("       {}", dim(&format!("Redefining Financial Security  ·  v{}  ·  rust", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn show_system_info() {
    use sysinfo::System;

    let mut sys = System::new_all();
    sys.refresh_all();

    section("System");

    println!("  {:<12} {}", muted("OS"), System::name().unwrap_or_else(|| "unknown".into()));
    println!("  {:<12} {}", muted("Arch"), std::env::consts::ARCH);
    println!("  {:<12} {}", muted("CPUs"), sys.cpus().len());
    println!("  {:<12} {:.1} / {:.1} GB", muted("Memory"),
        sys.used_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
        sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
    );
    println!("  {:<12} v{}", muted("Shield"), env!("CARGO_PKG_VERSION"));
    println!();
}

fn show_help() {
    section("Commands");

    let cmds: &[(&str, &str)] = &[
        ("fraud-shield", "Interactive launcher (default)"),
        ("fraud-shield serve", "Start web UI + API server"),
        ("fraud-shield serve -p 3000", "Serve on custom port"),
        ("fraud-shield analyze -i txns.csv", "Score a transaction CSV"),
        ("fraud-shield analyze -i txns.csv -o out.csv", "Score and save the results"),
        ("fraud-shield info -i txns.csv", "Inspect and validate a dataset"),
        ("fraud-shield models", "List model artifact candidates"),
    ];

    for (cmd, desc) in cmds {
        println!("  {:<44} {}", cmd.white(), muted(desc));
    }

    section("Endpoints");

    let endpoints: &[(&str, &str)] = &[
        ("http://localhost:8080", "Landing page"),
        ("http://localhost:8080/analyze", "Upload form"),
        ("http://localhost:8080/api/health", "Liveness probe"),
        ("http://localhost:8080/api/system/status", "Process & pipeline stats"),
    ];

    for (url, desc) in endpoints {
        println!("  {:<44} {}", url.truecolor(120, 170, 255), muted(desc));
    }

    println!();
}

pub async fn cmd_interactive() -> anyhow::Result<()> {
    use dialoguer::{Select, theme::ColorfulTheme};

    print_banner();

    let theme = ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ▸".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(246),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(117),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    };

    loop {
        let items = &[
            "Start Server          web ui + scoring api on :8080",
            "Model Artifacts       candidate files & status",
            "System Info           host hardware & runtime",
            "Help                  command & endpoint reference",
            "Exit",
        ];

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to run")
            .items(items)
            .default(0)
            .interact_opt()?;

        match sel {
            Some(0) => {
                cmd_serve("0.0.0.0", 8080).await?;
                break;
            }
            Some(1) => {
                cmd_models()?;
                wait_enter();
            }
            Some(2) => {
                show_system_info();
                wait_enter();
            }
            Some(3) => {
                show_help();
                wait_enter();
            }
            Some(4) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
