//! apicheck CLI - Scenario-based API contract checking with strict exit codes

mod storage;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use apicheck_core::{Config, ValidationStatus};
use apicheck_runner::{Selection, env_from_config, full_suite, run_suite};

#[derive(Parser)]
#[command(name = "apicheck")]
#[command(about = "Scenario-based API contract checking with strict exit codes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario suite
    Run {
        /// Only run this scenario group
        #[arg(short, long)]
        group: Option<String>,

        /// Substring filter over group::scenario labels
        #[arg(short, long)]
        filter: Option<String>,

        /// Config file (default: .apicheck.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Worker threads for group-level parallelism
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },

    /// Show the scenario plan without sending requests
    List,

    /// Initialize config file
    Init,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            group,
            filter,
            config,
            jobs,
        } => {
            // Load config
            let cfg = if let Some(path) = config {
                Config::load(std::path::Path::new(&path))?
            } else {
                Config::load_default()?
            };

            // Pre-flight validation; errors are tool errors, not failures
            let checks = cfg.validate();
            let mut invalid = false;
            for check in &checks {
                match check.status {
                    ValidationStatus::Ok => {}
                    ValidationStatus::Warning => eprintln!("Warning: {}", check.message),
                    ValidationStatus::Error => {
                        eprintln!("Error: {}", check.message);
                        invalid = true;
                    }
                }
            }
            if invalid {
                return Ok(3);
            }

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url);
                eprintln!("  timeout:  {}s", cfg.timeout_secs);
                eprintln!();
            }

            let env = env_from_config(&cfg)?;
            let selection = Selection { group, filter };

            let run_start = Instant::now();
            let report = run_suite(&env, full_suite(), &selection, jobs.max(1));
            let duration_secs = run_start.elapsed().as_secs_f64();

            let verdict = report.verdict();

            match cli.output {
                OutputFormat::Terminal => {
                    print!("{}", report.to_terminal());
                }
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": {
                            "status": format!("{}", verdict.status),
                            "exit_code": verdict.exit_code,
                            "reason": verdict.reason,
                        },
                        "counts": {
                            "passed": report.passed(),
                            "failed": report.failed(),
                            "skipped": report.skipped(),
                        },
                        "results": report.results,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            // Persist report to ~/.apicheck/reports/
            let data = storage::ReportData {
                config: &cfg,
                report: &report,
                verdict: &verdict,
                duration_secs,
            };
            match storage::save_report(&data) {
                Ok(path) => {
                    if cli.output != OutputFormat::Silent {
                        eprintln!("Report saved: {}", path.display());
                    }
                }
                Err(e) => eprintln!("Warning: failed to save report: {e}"),
            }

            Ok(verdict.exit_code)
        }

        Commands::List => {
            let groups = full_suite();
            match cli.output {
                OutputFormat::Terminal => {
                    for group in &groups {
                        println!(
                            "{} ({:?} setup, {} scenarios)",
                            group.name,
                            group.scope,
                            group.scenarios.len()
                        );
                        for scenario in &group.scenarios {
                            println!("  {}::{}", group.name, scenario.name);
                        }
                    }
                }
                OutputFormat::Json => {
                    let plan: Vec<serde_json::Value> = groups
                        .iter()
                        .map(|group| {
                            serde_json::json!({
                                "group": group.name,
                                "scope": format!("{:?}", group.scope),
                                "scenarios": group
                                    .scenarios
                                    .iter()
                                    .map(|s| s.name)
                                    .collect::<Vec<_>>(),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".apicheck.toml";
            if std::path::Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: booking service to test");
            println!("  - username/password: credentials for POST /auth");
            println!("  - timeout_secs: per-call timeout");
            Ok(0)
        }

        Commands::Schema => {
            let schema = apicheck_core::report::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}
