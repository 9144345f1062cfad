//! course-match CLI.
//!
//! Reads a section table, solves for the best schedule and prints or saves it.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use course_match::config::{self, CREDIT_LIMIT_DEFAULT, DEFAULT_EXCLUSIVITY_GROUPS};
use course_match::conflict::{GroupedStrategy, conflicts, group_key};
use course_match::{ConflictMode, MatchRequest, SolverKind, StudentYear, export, logging, optimize, source};

#[derive(Parser)]
#[command(name = "course-match")]
#[command(about = "Pick the best-scoring set of course sections for a student")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the best schedule.
    Solve {
        /// Section table (.xlsx or .csv)
        file: PathBuf,
        /// Student year: "1st Year" or "2nd Year"
        #[arg(short, long, env = "COURSE_MATCH_YEAR", default_value = "1st Year")]
        year: String,
        /// Maximum credits (0.0 to 7.0)
        #[arg(short, long, default_value_t = CREDIT_LIMIT_DEFAULT)]
        credit_limit: f64,
        /// Conflict strategy: grouped or pairwise
        #[arg(short, long, default_value = "grouped")]
        mode: String,
        /// JSON file with extra exclusivity groups
        #[arg(long)]
        exclusions: Option<PathBuf>,
        /// Do not apply the built-in exclusivity groups
        #[arg(long)]
        no_default_exclusions: bool,
        /// Solver backend: lp or cp-sat
        #[arg(long, env = "COURSE_MATCH_SOLVER", default_value = "lp")]
        solver: String,
        /// Time limit in seconds (cp-sat only)
        #[arg(long)]
        time_limit: Option<f64>,
        /// Write the schedule to this file (.xlsx or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how each conflict strategy sees the section table.
    Groups {
        /// Section table (.xlsx or .csv)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            year,
            credit_limit,
            mode,
            exclusions,
            no_default_exclusions,
            solver,
            time_limit,
            output,
        } => {
            let year: StudentYear = year.parse().map_err(|e: String| anyhow!(e))?;
            let mode: ConflictMode = mode.parse().map_err(|e: String| anyhow!(e))?;
            let solver_kind: SolverKind = solver.parse().map_err(|e: String| anyhow!(e))?;

            let mut groups = if no_default_exclusions {
                Vec::new()
            } else {
                DEFAULT_EXCLUSIVITY_GROUPS.clone()
            };
            if let Some(path) = exclusions {
                groups.extend(config::load_exclusivity_groups(&path)?);
            }

            let params = MatchRequest::new(year, credit_limit).to_params(groups, mode)?;
            let sections = source::load_sections(&file).with_context(|| format!("loading {}", file.display()))?;
            info!(sections = sections.len(), year = %year, budget = params.budget, "loaded sections");

            let solver = solver_kind.create(time_limit)?;
            let outcome = optimize(&sections, &params, solver.as_ref())?;

            println!("Solver status: {}", outcome.status);
            print!("{}", export::render_table(&outcome.schedule));

            if let Some(path) = output {
                match path.extension().and_then(|e| e.to_str()) {
                    Some("xlsx") => export::write_xlsx(&outcome.schedule, &path)?,
                    Some("json") => std::fs::write(&path, export::to_json(&outcome)?)
                        .with_context(|| format!("writing {}", path.display()))?,
                    _ => bail!("unsupported output format: {}", path.display()),
                }
                info!(path = %path.display(), "schedule written");
            }
        }

        Commands::Groups { file } => {
            let sections = source::load_sections(&file).with_context(|| format!("loading {}", file.display()))?;

            println!("Grouped buckets:");
            for (key, members) in GroupedStrategy::groups(&sections) {
                let ids: Vec<&str> = members.iter().map(|i| sections[*i].section_id.as_str()).collect();
                println!("  {key}: {}", ids.join(", "));
            }

            println!("Pairwise conflicts:");
            for (i, a) in sections.iter().enumerate() {
                for b in sections.iter().skip(i + 1) {
                    if conflicts(a, b) {
                        let note = if group_key(a) == group_key(b) { "" } else { "  (not caught by grouping)" };
                        println!("  {} x {}{note}", a.section_id, b.section_id);
                    }
                }
            }
        }
    }

    Ok(())
}
