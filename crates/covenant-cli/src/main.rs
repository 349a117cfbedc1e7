//! covenant command-line tool.
//!
//! Runs JSON check scripts (see `covenant_check::CheckScript`):
//! - `check` runs a script as an ad hoc session under its failure policy;
//! - `guard` uses a script as the precondition specification of a function
//!   whose parameters are recovered from `--signature`, then calls it with
//!   the given arguments. The guarded body echoes its arguments.
//!
//! The outcome is printed to stdout as JSON; logs go to stderr.
//!
//! Configuration:
//! - `--policy` overrides the script's policy selector for `check`;
//! - `COVENANT_POLICY` is used when `--policy` is absent.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use covenant_check::{
    function, pre, CheckScript, ContractError, Declaration, FailurePolicy, Messenger,
    ReportSnapshot, Value,
};

const EXIT_OK: i32 = 0;
const EXIT_VIOLATION: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_IO: i32 = 3;

/// Runtime contract checks from JSON scripts.
#[derive(Parser)]
#[command(name = "covenant", about = "Runtime contract checks from JSON scripts")]
struct Cli {
    /// Log verbosity: -v for debug, -vv for trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run a check script as an ad hoc session.
    Check {
        /// Path to the JSON check script.
        script: PathBuf,

        /// Failure policy: collect, assert or precondition.
        #[arg(short, long)]
        policy: Option<FailurePolicy>,
    },

    /// Guard a function with a check script and call it.
    Guard {
        /// Path to the JSON check script used as the specification.
        script: PathBuf,

        /// Declaration to recover parameter names from, e.g. "fn divide(n, d)".
        #[arg(short, long)]
        signature: String,

        /// Call arguments; JSON values, or plain strings when not valid JSON.
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// JSON outcome printed by every subcommand.
#[derive(Debug, Serialize)]
struct Outcome {
    policy: FailurePolicy,
    count: usize,
    passed: usize,
    failed: usize,
    reports: Vec<ReportSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Outcome {
    fn new(policy: FailurePolicy, reports: Vec<ReportSnapshot>) -> Self {
        let failed = reports.iter().filter(|r| !r.pass).count();
        Outcome {
            policy,
            count: reports.len(),
            passed: reports.len() - failed,
            failed,
            reports,
            result: None,
            error: None,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Check { script, policy } => run_check(&script, policy),
        Commands::Guard {
            script,
            signature,
            args,
        } => run_guard(&script, &signature, &args),
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_script(path: &Path) -> Result<CheckScript, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    CheckScript::from_json(&text)
        .map_err(|e| format!("failed to parse '{}': {}", path.display(), e))
}

/// Policy precedence: flag, then `COVENANT_POLICY`, then the script.
fn resolve_policy(
    flag: Option<FailurePolicy>,
    env: Option<String>,
    script: &CheckScript,
) -> Result<FailurePolicy, String> {
    if let Some(policy) = flag {
        return Ok(policy);
    }
    match env {
        Some(value) => value.parse(),
        None => Ok(script.policy()),
    }
}

fn exit_code_for(result: &Result<(), ContractError>, outcome: &Outcome) -> i32 {
    match result {
        Err(e) if e.is_violation() => EXIT_VIOLATION,
        Err(_) => EXIT_USAGE,
        Ok(()) if outcome.failed > 0 => EXIT_VIOLATION,
        Ok(()) => EXIT_OK,
    }
}

fn print_outcome(outcome: &Outcome) {
    let json = serde_json::to_string_pretty(outcome).unwrap_or_else(|e| {
        format!("{{\"error\": \"failed to serialize outcome: {}\"}}", e)
    });
    println!("{}", json);
}

/// Execute the check subcommand.
fn run_check(path: &Path, flag: Option<FailurePolicy>) -> i32 {
    let script = match load_script(path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return EXIT_IO;
        }
    };
    let policy = match resolve_policy(flag, std::env::var("COVENANT_POLICY").ok(), &script) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return EXIT_USAGE;
        }
    };
    tracing::info!(script = %path.display(), %policy, "running check session");

    let (outcome, code) = check_session(&script, policy);
    print_outcome(&outcome);
    code
}

fn check_session(script: &CheckScript, policy: FailurePolicy) -> (Outcome, i32) {
    let messenger = Messenger::new(policy);
    let result = script.run(&messenger);

    let mut outcome = Outcome::new(policy, messenger.as_array());
    let code = exit_code_for(&result, &outcome);
    outcome.error = result.err().map(|e| e.to_string());
    (outcome, code)
}

/// Execute the guard subcommand.
fn run_guard(path: &Path, signature: &str, raw_args: &[String]) -> i32 {
    let script = match load_script(path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return EXIT_IO;
        }
    };
    let args: Vec<Value> = raw_args.iter().map(|raw| parse_arg(raw)).collect();
    tracing::info!(script = %path.display(), signature, args = args.len(), "running guarded call");

    let (outcome, code) = guard_call(&script, signature, &args);
    print_outcome(&outcome);
    code
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw))
}

fn guard_call(script: &CheckScript, signature: &str, args: &[Value]) -> (Outcome, i32) {
    let guarded = pre(
        function(Declaration::new(signature), |args: &[Value]| {
            Value::array(args.iter().cloned())
        }),
        |p| script.apply(p),
    );
    let (result, reports) = guarded.call_traced(args);

    let mut outcome = Outcome::new(FailurePolicy::Precondition, reports);
    match result {
        Ok(value) => {
            let code = exit_code_for(&Ok(()), &outcome);
            outcome.result = value.map(serde_json::Value::from);
            (outcome, code)
        }
        Err(e) => {
            let code = exit_code_for(&Err(e.clone()), &outcome);
            outcome.error = Some(e.to_string());
            (outcome, code)
        }
    }
}
