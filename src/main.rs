use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use skill_planner::catalog::{load_catalog_with_costs, SkillCatalog};
use skill_planner::config::{Config, ConfigOverrides};
use skill_planner::history::{PlanRecord, PlanStore};
use skill_planner::output::csv::{history_to_csv, plan_to_csv};
use skill_planner::output::json::render_json;
use skill_planner::output::table::{
    render_catalog_table, render_history_table, render_plan_table, render_rows_table,
};
use skill_planner::planner::extract::extract_candidates;
use skill_planner::planner::{optimize, PlanResult, ScoringMode};
use skill_planner::rows::{parse_rows, serialize_rows};
use skill_planner::server::run_server;
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "skill-planner",
    about = "Budget-constrained skill purchase optimizer"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Catalog file (.csv or .json); overrides the configured path.
    #[arg(long)]
    catalog: Option<String>,
    /// JSON cost map merged over the catalog.
    #[arg(long = "cost-map")]
    cost_map: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan the best purchase set for a build file.
    Optimize {
        /// Build rows file, one `Name=cost|H<n>|R` row per line.
        rows: PathBuf,
        #[arg(short, long)]
        budget: Option<u32>,
        #[arg(short, long)]
        mode: Option<String>,
        #[arg(long = "fast-learner")]
        fast_learner: bool,
        /// Skip writing the run into the plan history database.
        #[arg(long = "no-persist")]
        no_persist: bool,
    },
    /// Parse a build file and echo it back in canonical form.
    Rows {
        rows: PathBuf,
    },
    /// Summarize the loaded catalog.
    Catalog,
    /// Show recent planning runs.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        catalog_path: cli.catalog.clone(),
        cost_map: cli.cost_map.clone(),
        ..Default::default()
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }

    let catalog = load_catalog(&config)?;

    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, catalog, addr).await;
    }

    match &cli.command {
        Commands::Optimize {
            rows,
            budget,
            mode,
            fast_learner,
            no_persist,
        } => {
            let rows_text = fs::read_to_string(rows)
                .with_context(|| format!("failed reading build file: {}", rows.display()))?;
            let parsed = parse_rows(&rows_text).map_err(|e| anyhow!(e))?;
            if parsed.is_empty() {
                return Err(anyhow!("build file has no rows: {}", rows.display()));
            }

            let budget = budget.unwrap_or(config.planner.budget);
            let mode = match mode.as_deref() {
                Some(raw) => ScoringMode::from_str(raw)?,
                None => config.planner.mode,
            };
            let fast_learner = *fast_learner || config.planner.fast_learner;

            let candidates =
                extract_candidates(&parsed, &catalog, &config.affinity, fast_learner);
            if candidates.is_empty() {
                return Err(anyhow!("no build row matched the catalog"));
            }
            let plan = optimize(&candidates, budget, mode);

            if !*no_persist {
                let store = PlanStore::open(&config.resolved_db_path())?;
                let record = PlanRecord::new(
                    catalog.raw_hash.clone(),
                    mode,
                    serialize_rows(&parsed),
                    plan.clone(),
                );
                store.insert_plan(&record)?;
            }
            print_plan(&plan, cli.output)?;
        }
        Commands::Rows { rows } => {
            let rows_text = fs::read_to_string(rows)
                .with_context(|| format!("failed reading build file: {}", rows.display()))?;
            let parsed = parse_rows(&rows_text).map_err(|e| anyhow!(e))?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_rows_table(&parsed)),
                OutputFormat::Json => println!("{}", render_json(&parsed)?),
                OutputFormat::Csv => {
                    warn!("CSV output for rows not implemented, using canonical text");
                    print!("{}", serialize_rows(&parsed));
                }
            }
        }
        Commands::Catalog => match cli.output {
            OutputFormat::Table => println!("{}", render_catalog_table(&catalog)),
            OutputFormat::Json => println!("{}", render_json(&catalog)?),
            OutputFormat::Csv => {
                warn!("CSV output for catalog not implemented, using JSON");
                println!("{}", render_json(&catalog)?);
            }
        },
        Commands::History { limit } => {
            let store = PlanStore::open(&config.resolved_db_path())?;
            let records = store.load_recent(*limit)?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_history_table(&records)),
                OutputFormat::Json => {
                    let plans: Vec<&PlanResult> = records.iter().map(|r| &r.plan).collect();
                    println!("{}", render_json(&plans)?);
                }
                OutputFormat::Csv => println!("{}", history_to_csv(&records)?),
            }
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn load_catalog(config: &Config) -> Result<SkillCatalog> {
    if config.catalog.path.trim().is_empty() {
        return Err(anyhow!(
            "no catalog configured; pass --catalog or set [catalog] path in {}",
            Config::default_path().display()
        ));
    }
    let catalog_path = config.resolved_catalog_path();
    let cost_map_path = config.resolved_cost_map_path();
    load_catalog_with_costs(&catalog_path, cost_map_path.as_deref())
}

fn print_plan(plan: &PlanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_plan_table(plan)),
        OutputFormat::Json => println!("{}", render_json(plan)?),
        OutputFormat::Csv => println!("{}", plan_to_csv(plan)?),
    }
    Ok(())
}
