//! roi - compute the cost of change, the cost of no change and the net ROI
//! of an initiative from a formula payload

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use roi_cruncher::{format_amount, format_equation, normalize, Group, RoiPayload, RoiSession};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser)]
#[command(name = "roi")]
#[command(
    author,
    version,
    about = "Evaluate the ROI formulas of a change initiative"
)]
struct Cli {
    /// JSON payload with coceqn, cocvar, conceqn and concvar ("-" for stdin)
    payload: PathBuf,

    /// Override a variable, as name=value (repeatable, applied in order)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Show the formulas, their normalized form and the variables
    #[arg(short, long)]
    explain: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let json = read_payload(&cli.payload)?;
    let payload = RoiPayload::from_json(&json)
        .with_context(|| format!("Failed to decode payload {}", cli.payload.display()))?;
    let mut session = RoiSession::from_payload(payload);

    for assignment in &cli.set {
        let (name, value) = match assignment.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => bail!("Invalid assignment '{}', expected NAME=VALUE", assignment),
        };
        session.set_variable(name, value);
    }

    match cli.format {
        Format::Json => print_json(&session),
        Format::Text => {
            print_text(&session, cli.explain);
            Ok(())
        }
    }
}

fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut json = String::new();
        io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read payload from stdin")?;
        Ok(json)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload {}", path.display()))
    }
}

fn print_json(session: &RoiSession) -> Result<()> {
    let output = serde_json::json!({
        "result": session.result(),
        "cost_of_change": session.outcome(Group::CostOfChange),
        "cost_of_no_change": session.outcome(Group::CostOfNoChange),
    });
    let text = serde_json::to_string_pretty(&output).context("Failed to encode result")?;
    println!("{}", text);
    Ok(())
}

fn print_text(session: &RoiSession, explain: bool) {
    let result = session.result();
    println!("Cost of Change:    {:>16}", format_amount(result.cost_of_change()));
    println!("Cost of No Change: {:>16}", format_amount(result.cost_of_no_change()));
    println!("Net ROI:           {:>16}", format_amount(result.net_roi()));

    for group in [Group::CostOfChange, Group::CostOfNoChange].iter().copied() {
        let outcome = session.outcome(group);
        if let Some(err) = outcome.error() {
            println!("warning: {} formula fell back to 0: {}", group.title(), err);
        }
        if !explain {
            continue;
        }

        let formula = &session.group(group).expression;
        println!();
        println!("{}", group.title());
        println!("  formula:    {}", format_equation(formula));
        println!("  arithmetic: {}", normalize(formula, session.variables()));
        for (spec, value) in session.variables_for(group) {
            let shown = if spec.is_monetary() {
                format!("${}", format_amount(value))
            } else {
                value.to_string()
            };
            println!("  {:<24} {:>16}  {}", spec.label(), shown, spec.description);
        }
    }
}
