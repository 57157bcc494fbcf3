//! RIDEBID: ride-hailing bid pricing assistant
//!
//! Entry point. Loads configuration, initialises structured logging and
//! dispatches one of the subcommands: synthetic data generation, dataset
//! summary, model training, price optimisation, or the whole pipeline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use ridebid::config::AppConfig;
use ridebid::data::cleaning::prepare_training_rows;
use ridebid::data::summary::DatasetSummary;
use ridebid::data::synthetic::{generate_orders, SyntheticConfig};
use ridebid::data::{read_csv, write_csv};
use ridebid::estimator::adapter::ModelEstimator;
use ridebid::estimator::training::{train, TrainingOptions};
use ridebid::estimator::AcceptanceEstimator;
use ridebid::pricing::{PriceSearch, SearchConfig};
use ridebid::storage::{self, RecommendationReport};
use ridebid::types::OrderContext;

const BANNER: &str = r#"
 ____  ___ ____  _____ ____ ___ ____
|  _ \|_ _|  _ \| ____| __ )_ _|  _ \
| |_) || || | | |  _| |  _ \| || | | |
|  _ < | || |_| | |___| |_) | || |_| |
|_| \_\___|____/|_____|____/___|____/

  Bid acceptance model & revenue-maximizing price search
  v0.1.0
"#;

#[derive(Parser)]
#[command(name = "ridebid", version, about = "Ride-hailing bid pricing assistant")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic order dataset as CSV.
    Generate {
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Print acceptance statistics for a dataset.
    Summary {
        #[arg(long)]
        data: Option<String>,
    },
    /// Clean a dataset, fit the acceptance model and save the artifact.
    Train {
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Recommend a bid price for one order.
    Optimize(OptimizeArgs),
    /// Generate, train and optimize with configured defaults.
    Pipeline,
}

#[derive(Args, Clone)]
struct OptimizeArgs {
    /// Base (start) price of the order.
    #[arg(long, default_value_t = 300.0)]
    base_price: f64,
    #[arg(long)]
    driver_rating: Option<f64>,
    #[arg(long)]
    distance_km: Option<f64>,
    #[arg(long)]
    order_hour: Option<u8>,
    #[arg(long)]
    min_markup: Option<f64>,
    #[arg(long)]
    max_markup: Option<f64>,
    #[arg(long)]
    steps: Option<usize>,
    /// Minimum acceptance probability for the safe price.
    #[arg(long)]
    floor: Option<f64>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    report: Option<String>,
    /// Also run the built-in demo scenarios.
    #[arg(long)]
    scenarios: bool,
}

impl OptimizeArgs {
    fn order(&self) -> OrderContext {
        let mut order = OrderContext::new(self.base_price);
        order.driver_rating = self.driver_rating;
        order.distance_km = self.distance_km;
        order.order_hour = self.order_hour;
        order
    }

    fn search_config(&self, cfg: &AppConfig) -> SearchConfig {
        let mut search = SearchConfig::from(&cfg.search);
        if let Some(v) = self.min_markup {
            search.min_markup = v;
        }
        if let Some(v) = self.max_markup {
            search.max_markup = v;
        }
        if let Some(v) = self.steps {
            search.steps = v;
        }
        if let Some(v) = self.floor {
            search.safe_probability_floor = v;
        }
        search
    }
}

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let cfg = AppConfig::load_or_default(&cli.config)?;

    println!("{BANNER}");
    info!(config = %cli.config, "RIDEBID starting up");

    match cli.command {
        Command::Generate { rows, seed, output } => {
            let output = output.unwrap_or_else(|| cfg.paths.data.clone());
            run_generate(&cfg, rows, seed, &output)
        }
        Command::Summary { data } => {
            let data = data.unwrap_or_else(|| cfg.paths.data.clone());
            run_summary(&data)
        }
        Command::Train { data, model } => {
            let data = data.unwrap_or_else(|| cfg.paths.data.clone());
            let model = model.unwrap_or_else(|| cfg.paths.model.clone());
            run_train(&cfg, &data, &model)
        }
        Command::Optimize(args) => run_optimize(&cfg, &args),
        Command::Pipeline => run_pipeline(&cfg),
    }
}

fn run_generate(cfg: &AppConfig, rows: Option<usize>, seed: Option<u64>, output: &str) -> Result<()> {
    let synth = SyntheticConfig {
        rows: rows.unwrap_or(cfg.data.rows),
        seed: seed.unwrap_or(cfg.data.seed),
        ..SyntheticConfig::default()
    };
    let records = generate_orders(&synth);
    write_csv(output, &records)?;
    println!("Wrote {} orders to {output}", records.len());
    Ok(())
}

fn run_summary(data: &str) -> Result<()> {
    let records = read_csv(data)?;
    println!("{}", DatasetSummary::from_records(&records));
    Ok(())
}

fn run_train(cfg: &AppConfig, data: &str, model_path: &str) -> Result<()> {
    let records = read_csv(data)?;
    let (rows, cleaning) = prepare_training_rows(&records, cfg.training.trim_quantile);
    println!("-- Cleaning --\n{cleaning}\n");

    let outcome = train(&rows, &TrainingOptions::from(&cfg.training))
        .with_context(|| format!("Training on {data} failed"))?;

    println!("-- Evaluation ({} train / {} test) --", outcome.train_rows, outcome.test_rows);
    println!("Train acceptance rate: {:.1}%", outcome.train_acceptance_rate * 100.0);
    println!("{}", outcome.metrics);
    println!("-- Feature importance --");
    for (name, weight) in &outcome.feature_importance {
        println!("  {name:<18} {:>5.1}%", weight * 100.0);
    }

    outcome.model.save(model_path)?;
    println!("\nModel saved to {model_path}");
    Ok(())
}

fn run_optimize(cfg: &AppConfig, args: &OptimizeArgs) -> Result<()> {
    let model_path = args.model.clone().unwrap_or_else(|| cfg.paths.model.clone());
    let estimator = ModelEstimator::from_artifact(&model_path, cfg.features)?;
    let search = PriceSearch::new(estimator, args.search_config(cfg));

    let order = args.order();
    let rec = search.find_optimal_price(&order)?;
    println!("-- Order: {order} --\n{rec}");

    let report = RecommendationReport::from_recommendation(&order, search.estimator().model_name(), &rec);
    let report_path = args.report.clone().unwrap_or_else(|| cfg.paths.report.clone());
    storage::save_report(&report, Some(&report_path))?;
    println!("Report saved to {report_path}");

    if args.scenarios {
        for (name, order) in demo_scenarios() {
            match search.find_optimal_price(&order) {
                Ok(rec) => println!("-- Scenario: {name} ({order}) --\n{rec}"),
                Err(e) => warn!(scenario = name, error = %e, "Scenario failed"),
            }
        }
    }
    Ok(())
}

fn run_pipeline(cfg: &AppConfig) -> Result<()> {
    info!("Step 1/3: generating data");
    run_generate(cfg, None, None, &cfg.paths.data)?;

    info!("Step 2/3: training model");
    run_train(cfg, &cfg.paths.data, &cfg.paths.model)?;

    info!("Step 3/3: optimizing price");
    let args = OptimizeArgs {
        base_price: 300.0,
        driver_rating: Some(4.7),
        distance_km: Some(5.2),
        order_hour: Some(18),
        min_markup: None,
        max_markup: None,
        steps: None,
        floor: None,
        model: None,
        report: None,
        scenarios: true,
    };
    run_optimize(cfg, &args)
}

/// Representative orders for a quick sanity check of a trained model.
fn demo_scenarios() -> Vec<(&'static str, OrderContext)> {
    vec![
        (
            "high rating, short trip",
            OrderContext::new(300.0)
                .with_driver_rating(4.9)
                .with_distance_km(3.0)
                .with_order_hour(10),
        ),
        (
            "low rating, long night trip",
            OrderContext::new(300.0)
                .with_driver_rating(4.0)
                .with_distance_km(20.0)
                .with_order_hour(3),
        ),
        (
            "evening rush hour",
            OrderContext::new(300.0)
                .with_driver_rating(4.5)
                .with_distance_km(8.0)
                .with_order_hour(19),
        ),
    ]
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ridebid=info"));

    let json_logging = std::env::var("RIDEBID_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
