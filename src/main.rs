use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use contract_case::context::parse_serialisable_to;
use contract_case::contract::read_contract;
use contract_case::printer::{ConsolePrinter, ResultPrinter};
use contract_case::states::StateSetups;
use contract_case::verifier::{CaseVerifier, VerifierConfig};
use contract_case::{AnyData, CaseError, CaseNode, Engine, LogLevel, MatchBy, MatchConfig, MatchResult};

const EXIT_MISMATCH: u8 = 1;
const EXIT_FAULT: u8 = 2;

/// Check, strip and verify contract matchers from the command line.
#[derive(Parser, Debug)]
#[command(name = "ccase", author, version, about)]
struct Args {
    /// Match by `exact` value or only by `type`
    #[arg(long, global = true, default_value = "exact", value_parser = parse_match_by)]
    match_by: MatchBy,
    /// Serialisation target the values must survive: `json` or `none`
    #[arg(long, global = true, default_value = "json")]
    serialisable_to: String,
    /// none, error, warn, info, debug or maintainerDebug
    #[arg(long, global = true, default_value = "warn", value_parser = parse_log_level)]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an actual JSON value against a matcher tree
    Check { matcher: String, actual: String },
    /// Print the example a matcher tree describes
    Strip { matcher: String },
    /// Check that a matcher tree accepts its own example
    SelfVerify { matcher: String },
    /// Replay a contract file against a running provider
    Verify {
        contract: PathBuf,
        #[arg(long)]
        base_url: String,
        #[arg(long)]
        ignore_missing_states: bool,
    },
}

fn parse_match_by(s: &str) -> Result<MatchBy, String> {
    s.parse().map_err(|e: CaseError| e.to_string())
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse().map_err(|e: CaseError| e.to_string())
}

fn parse_matcher(json: &str) -> contract_case::Result<CaseNode> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| CaseError::Configuration(format!("Matcher is not valid JSON: {e}")))?;
    CaseNode::from_contract_json(value)
}

fn parse_actual(json: &str) -> contract_case::Result<AnyData> {
    serde_json::from_str::<Value>(json)
        .map(AnyData::from)
        .map_err(|e| CaseError::Configuration(format!("Actual value is not valid JSON: {e}")))
}

fn report(errors: &MatchResult) -> contract_case::Result<ExitCode> {
    if errors.is_empty() {
        println!("OK");
        return Ok(ExitCode::SUCCESS);
    }
    let printer = ConsolePrinter::stdout();
    for error in errors {
        printer.print_error(error)?;
    }
    Ok(ExitCode::from(EXIT_MISMATCH))
}

async fn run(args: Args) -> contract_case::Result<ExitCode> {
    let config = MatchConfig {
        match_by: args.match_by,
        serialisable_to: parse_serialisable_to(&args.serialisable_to)?,
        log_level: args.log_level,
        ..MatchConfig::default()
    };
    let engine = Engine::new(config.clone());

    match args.command {
        Command::Check { matcher, actual } => {
            let errors = engine
                .check_match(&parse_matcher(&matcher)?, &parse_actual(&actual)?)
                .await?;
            report(&errors)
        }
        Command::Strip { matcher } => {
            let example = engine.strip_matchers(&parse_matcher(&matcher)?)?;
            let pretty = serde_json::to_string_pretty(&Value::from(example))
                .map_err(|e| CaseError::Core(e.to_string()))?;
            println!("{pretty}");
            Ok(ExitCode::SUCCESS)
        }
        Command::SelfVerify { matcher } => {
            let errors = engine.self_verify(&parse_matcher(&matcher)?).await?;
            report(&errors)
        }
        Command::Verify {
            contract,
            base_url,
            ignore_missing_states,
        } => {
            let data = read_contract(&contract)?;
            let printer: Arc<dyn ResultPrinter> = Arc::new(ConsolePrinter::stdout());
            let verifier = CaseVerifier::new(
                VerifierConfig {
                    base_url: Some(base_url),
                    ignore_missing_states,
                    match_config: config,
                },
                StateSetups::new(),
                printer,
            )?;
            let outcome = verifier.verify(&data).await?;
            Ok(if outcome.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_MISMATCH)
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level.level_filter())
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(EXIT_FAULT)
        }
    }
}
