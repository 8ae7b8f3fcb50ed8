//! `cortex estimate`: run a configured memory estimator over a node's inputs.

use std::io::Read;

use cortex_config::{ConfigError, CortexConfig};
use cortex_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use cortex_estimate::{Estimate, Inputs, ResourceEstimator};
use serde::Serialize;

use crate::report::render_and_report;
use crate::{EstimateArgs, GlobalArgs, ReportFormat};

/// An input was supplied that the estimator declares no weight for.
const UNDECLARED_INPUT: DiagnosticCode = DiagnosticCode::new(Category::Estimate, 101);

#[derive(Serialize)]
struct Report<'a> {
    tool: &'a str,
    #[serde(flatten)]
    estimate: &'a Estimate,
}

/// Runs the `cortex estimate` command.
pub fn run(args: &EstimateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = crate::config::load(global)?;
    let estimator = lookup(&config, &args.tool)?;

    let text = if args.inputs == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.inputs)
            .map_err(|e| format!("cannot read inputs {}: {e}", args.inputs))?
    };
    let inputs = parse_inputs(&text)?;

    let sink = DiagnosticSink::new();
    check_declared(&estimator, &inputs, &args.tool, &sink);
    render_and_report(&sink, args.format, global);

    let estimate = estimator.estimate(&inputs);
    match args.format {
        ReportFormat::Text => {
            println!("{}: {:.3} GB", args.tool, estimate.memory_gb);
            if !global.quiet {
                for line in &estimate.trail {
                    println!("  {line}");
                }
            }
        }
        ReportFormat::Json => {
            let report = Report {
                tool: &args.tool,
                estimate: &estimate,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(0)
}

/// Builds the estimator for `tool`, naming the declared ones if it is unknown.
fn lookup(config: &CortexConfig, tool: &str) -> Result<ResourceEstimator, String> {
    config.estimator(tool).map_err(|err| match err {
        ConfigError::UnknownEstimator(_) => {
            let declared: Vec<&str> = config.estimator_names().collect();
            if declared.is_empty() {
                format!("{err}; no estimators are declared")
            } else {
                format!("{err}; declared: {}", declared.join(", "))
            }
        }
        other => other.to_string(),
    })
}

/// Warns about supplied inputs that no weight refers to.
fn check_declared(
    estimator: &ResourceEstimator,
    inputs: &Inputs,
    tool: &str,
    sink: &DiagnosticSink,
) {
    for name in inputs.keys() {
        if !estimator.weights().iter().any(|w| &w.input == name) {
            sink.emit(
                Diagnostic::warning(UNDECLARED_INPUT, format!("input '{name}' is ignored"))
                    .with_note(format!("estimator '{tool}' declares no weight for it")),
            );
        }
    }
}

fn parse_inputs(text: &str) -> Result<Inputs, String> {
    serde_json::from_str(text).map_err(|e| format!("inputs must be a JSON object: {e}"))
}
