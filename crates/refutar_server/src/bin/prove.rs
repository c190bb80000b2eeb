//! Command-line refutation prover

use std::{env, fs, process, time::Instant};

use refutar::{
    parse::parse_problem,
    resolution::{self, Params, Proof, ResolutionStep, TraceSink},
    session,
};
use serde::Serialize;

const USAGE: &str = "Usage: refutar-prove <file> [options]

Options:
  --max-rounds <n>        Give up after n rounds
  --max-clauses <n>       Give up when the knowledge base would exceed n clauses
  --timeout <seconds>     Give up after the given time
  --skip-resolved-pairs   Do not resolve pairs already resolved in an earlier round
  --json                  Print the result and all steps as JSON
  --quiet                 Only print the verdict";

const EXIT_PROVEN: i32 = 0;
const EXIT_NOT_PROVEN: i32 = 1;
const EXIT_ERROR: i32 = 2;

struct Options {
    file: String,
    params: Params,
    json: bool,
    quiet: bool,
}

fn value<T: std::str::FromStr>(flag: &str, v: Option<&String>) -> Result<T, String> {
    let v = v.ok_or_else(|| format!("Missing value for {flag}"))?;
    v.parse()
        .map_err(|_| format!("Invalid value '{v}' for {flag}"))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut file = None;
    let mut params = Params::default();
    let mut json = false;
    let mut quiet = false;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-rounds" => params.max_rounds = Some(value(arg, args.next())?),
            "--max-clauses" => params.max_clauses = Some(value(arg, args.next())?),
            "--timeout" => {
                let secs: u64 = value(arg, args.next())?;
                params.timeout_ms = Some(secs.saturating_mul(1000));
            }
            "--skip-resolved-pairs" => params.skip_resolved_pairs = true,
            "--json" => json = true,
            "--quiet" => quiet = true,
            a if a.starts_with("--") => return Err(format!("Unknown option: {a}")),
            a => {
                if file.replace(a.to_string()).is_some() {
                    return Err(format!("Unexpected argument: {a}"));
                }
            }
        }
    }

    Ok(Options {
        file: file.ok_or("Missing input file")?,
        params,
        json,
        quiet,
    })
}

/// Prints every step as it is committed.
struct StepPrinter;

impl TraceSink for StepPrinter {
    fn record(&mut self, step: ResolutionStep) {
        println!("\nStep {}:", step.step);
        println!("Resolving {} and {}", step.left, step.right);
        if step.is_refutation() {
            println!("Result: {} (empty clause, goal proven)", step.resolvent);
        } else {
            println!("Result: {}", step.resolvent);
        }
    }
}

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    proof: Proof,
    trace: Vec<ResolutionStep>,
}

fn run(opts: Options) -> Result<bool, String> {
    let text = fs::read_to_string(&opts.file)
        .map_err(|e| format!("Cannot read '{}': {e}", opts.file))?;
    let problem = parse_problem(&text).map_err(|e| e.to_string())?;

    if opts.json {
        let mut trace = Vec::new();
        let proof = resolution::prove(problem.base, problem.goal, &opts.params, &mut trace)
            .map_err(|e| e.to_string())?;
        let proven = proof.proven();
        let out = serde_json::to_string_pretty(&Report { proof, trace })
            .map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(proven);
    }

    if !opts.quiet {
        println!("Knowledge base (CNF):");
        for c in &problem.base {
            println!("{c}");
        }
        println!("\nGoal (negated query): {}", problem.goal);
        println!("\n=== Resolution ===");
    }

    let start = Instant::now();
    let res = if opts.quiet {
        resolution::prove(problem.base, problem.goal, &opts.params, resolution::NoTrace)
    } else {
        resolution::prove(problem.base, problem.goal, &opts.params, StepPrinter)
    };
    let proof = res.map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    if !opts.quiet {
        println!();
    }
    if proof.proven() {
        println!("The empty clause was derived: the goal is proven.");
    } else {
        println!("The goal could not be proven by resolution.");
    }
    if !opts.quiet {
        println!(
            "{} rounds, {} clauses, {} steps in {:.3}s",
            proof.rounds,
            proof.clauses,
            proof.steps,
            elapsed.as_secs_f64()
        );
    }
    Ok(proof.proven())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            process::exit(EXIT_ERROR);
        }
    };

    let code = match session(|| run(opts)) {
        Ok(true) => EXIT_PROVEN,
        Ok(false) => EXIT_NOT_PROVEN,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_ERROR
        }
    };
    process::exit(code);
}
