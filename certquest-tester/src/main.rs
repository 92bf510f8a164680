mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::scenario::{SCENARIOS, get_scenario, list_scenarios};
use common::{parse_seeds, split_csv};
use logic::{GameTester, LogicTester, ScenarioResult};

#[derive(Debug, Parser)]
#[command(name = "certquest-tester", version = "0.1.0")]
#[command(about = "Automated QA for the CertQuest progression engine using simulated players")]
struct Args {
    /// Comma-separated scenario keys; `all` runs every registered scenario
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// Print the scenario registry and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Base seeds, comma-separated; decimal or 0x-prefixed hex
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Runs per scenario and seed; iteration i uses seed + i
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Print per-iteration progress
    #[arg(short, long)]
    verbose: bool,

    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Persist runs as JSON files under this directory instead of in memory
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    info!(
        "running {} scenario(s) over {} seed(s), {} iteration(s) each",
        scenarios.len(),
        seeds.len(),
        args.iterations
    );
    let game_tester = GameTester::new(args.save_dir.clone(), args.verbose);

    let results = run_logic_scenarios(&args, &scenarios, &seeds, game_tester);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(out, "  {key:25} - {description}")?;
    }
    out.flush()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎓 CertQuest Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for scenario in SCENARIOS {
            if !scenarios.iter().any(|s| s == scenario.key) {
                scenarios.push(scenario.key.to_string());
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    game_tester: GameTester,
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(game_tester);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;

    match (args.report.as_str(), results.is_empty()) {
        ("json", _) => logic::reports::generate_json_report(&mut out, results)?,
        ("markdown", true) => writeln!(
            out,
            "# CertQuest Logic Test Results\n\n_No scenarios executed._"
        )?,
        ("markdown", false) => logic::reports::generate_markdown_report(&mut out, results)?,
        (_, true) => writeln!(out, "No logic scenarios executed.")?,
        (_, false) => {
            logic::reports::generate_console_report(&mut out, results, start_time.elapsed())?;
        }
    }

    // JSON output carries no footer.
    if args.report != "json" {
        writeln!(out)?;
        writeln!(out, "🏁 Total time: {:?}", start_time.elapsed())?;
    }
    out.flush()?;
    Ok(())
}

/// Report sink: the `--output` file when given, stdout otherwise.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(stdout()))),
    }
}
