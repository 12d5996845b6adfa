use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{Dataset, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use evaluation::{
    evaluate_model, evaluate_ranking, relevant_items, run_parallel, EvaluationReport,
    ModelReport, ModelRole,
};
use models::{
    Model, ModelConfig, ModelKind, Recommender, DEFAULT_NEIGHBORHOOD_SIZE, DEFAULT_RANK,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// BasketRecs - Purchase-Count Recommendation Engine
#[derive(Parser)]
#[command(name = "basket-recs")]
#[command(about = "Retail recommendations from purchase counts using SVD and neighborhood models", long_about = None)]
struct Cli {
    /// Path to a transaction file (`user,item[,quantity]` per line)
    #[arg(short, long, default_value = "data/transactions.csv")]
    data: PathBuf,

    /// Share of (user, item) pairs held out for evaluation
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    test_fraction: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Hyperparameters shared by every command that fits a model
#[derive(Args, Clone, Copy)]
struct ModelArgs {
    /// Latent factors kept by the SVD model
    #[arg(long, default_value_t = DEFAULT_RANK)]
    rank: usize,

    /// Neighbors weighted by the neighborhood models
    #[arg(long, default_value_t = DEFAULT_NEIGHBORHOOD_SIZE)]
    neighbors: usize,
}

impl ModelArgs {
    fn config(&self, kind: ModelKind) -> ModelConfig {
        ModelConfig::new(kind)
            .with_rank(self.rank)
            .with_neighborhood_size(self.neighbors)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend unpurchased items for a customer
    Recommend {
        /// Customer to recommend for
        #[arg(long)]
        user: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Model to use: latent, item or user
        #[arg(long, default_value = "item")]
        model: ModelKind,

        #[command(flatten)]
        params: ModelArgs,
    },

    /// Predict one customer's engagement with one item
    Predict {
        #[arg(long)]
        user: String,

        #[arg(long)]
        item: String,

        /// Model to use: latent, item or user
        #[arg(long, default_value = "item")]
        model: ModelKind,

        #[command(flatten)]
        params: ModelArgs,
    },

    /// Show a customer's training purchases
    User {
        #[arg(long)]
        user: String,
    },

    /// Evaluate all three models on the held-out split
    Evaluate {
        /// Cutoff for precision@k, recall@k and F1@k
        #[arg(short, long, default_value = "10")]
        k: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        params: ModelArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    eprintln!("Loading transactions from {}...", cli.data.display());
    let start = Instant::now();
    let dataset = Dataset::load_from_file(&cli.data, cli.test_fraction, cli.seed)
        .context("Failed to load transaction data")?;
    let (users, items) = dataset.train.shape();
    eprintln!(
        "{} Loaded {} customers x {} items in {:?}",
        "✓".green(),
        users,
        items,
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            user,
            limit,
            model,
            params,
        } => handle_recommend(&dataset, &user, limit, params.config(model))?,
        Commands::Predict {
            user,
            item,
            model,
            params,
        } => handle_predict(&dataset, &user, &item, params.config(model))?,
        Commands::User { user } => handle_user(&dataset, &user)?,
        Commands::Evaluate { k, json, params } => handle_evaluate(dataset, k, json, params).await?,
    }

    Ok(())
}

fn fit_model(dataset: &Dataset, config: &ModelConfig) -> Result<Model> {
    Model::fitted(config, &dataset.train)
        .with_context(|| format!("Failed to fit {} model", config.kind))
}

/// Handle the 'recommend' command
fn handle_recommend(dataset: &Dataset, user: &str, limit: usize, config: ModelConfig) -> Result<()> {
    if dataset.train.user_position(user).is_none() {
        return Err(anyhow!("Customer {} not found in training data", user));
    }

    let model = fit_model(dataset, &config)?;
    let recommendations = model.recommend(user, limit);

    println!(
        "{}",
        format!("Recommendations for {} ({}):", user, model.name()).bold().blue()
    );
    if recommendations.is_empty() {
        println!("  {}", "no scorable items".yellow());
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.4}",
            (rank + 1).to_string().green(),
            rec.item,
            rec.score
        );
    }
    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(dataset: &Dataset, user: &str, item: &str, config: ModelConfig) -> Result<()> {
    let model = fit_model(dataset, &config)?;

    match model.predict(user, item) {
        Ok(score) => println!("{} {} x {}: {:.4}", "✓".green(), user, item, score),
        Err(reason) => println!("{} {} x {}: unavailable ({})", "✗".red(), user, item, reason),
    }
    if let Some(observed) = dataset.train.get(user, item) {
        println!("{}Observed in training: {}", "• ".cyan(), observed);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(dataset: &Dataset, user: &str) -> Result<()> {
    let row = dataset
        .train
        .user_position(user)
        .ok_or_else(|| anyhow!("Customer {} not found in training data", user))?;

    let mut purchases: Vec<(&str, f64)> = dataset
        .train
        .rated_columns(row)
        .filter_map(|col| {
            let count = dataset.train.cell(row, col)?;
            Some((dataset.train.items()[col].as_str(), count))
        })
        .collect();
    purchases.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let held_out = dataset.test.iter().filter(|r| r.user == user).count();
    let total: f64 = purchases.iter().map(|(_, count)| count).sum();

    println!("{}", format!("Customer: {}", user).bold().blue());
    println!("{}Distinct items bought: {}", "• ".green(), purchases.len());
    println!("{}Purchase lines: {}", "• ".green(), total);
    println!("{}Held-out pairs: {}", "• ".cyan(), held_out);
    println!("Most purchased:");
    for (item, count) in purchases.iter().take(10) {
        println!("  - {} ({} purchases)", item, count);
    }
    Ok(())
}

/// Handle the 'evaluate' command
///
/// User and item models are evaluated concurrently; the latent model runs
/// afterwards on this thread.
async fn handle_evaluate(dataset: Dataset, k: usize, json: bool, params: ModelArgs) -> Result<()> {
    let start = Instant::now();
    let relevant = relevant_items(&dataset.test);
    let mut report = EvaluationReport::new(dataset.train.shape(), dataset.test.len(), k);

    let user_model = fit_model(&dataset, &params.config(ModelKind::UserNeighborhood))?;
    let item_model = fit_model(&dataset, &params.config(ModelKind::ItemNeighborhood))?;

    let evaluation = run_parallel(user_model.clone(), item_model.clone(), dataset.test.clone()).await;

    for (role, model) in [(ModelRole::User, &user_model), (ModelRole::Item, &item_model)] {
        let entry = match evaluation.get(role) {
            Ok(predictions) => ModelReport::from_predictions(model.name(), &dataset.test, predictions)
                .with_ranking(evaluate_ranking(model, &relevant, k).ok()),
            Err(err) => ModelReport::failed(model.name(), err),
        };
        report.push(entry);
    }

    match Model::fitted(&params.config(ModelKind::LatentFactor), &dataset.train) {
        Ok(latent) => report.push(evaluate_model(&latent, &dataset.test, &relevant, k)),
        Err(err) => {
            warn!("Skipping latent factor model: {}", err);
            report.push(ModelReport::failed("LatentFactorModel", err));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        println!("Evaluated in {:.2?}", start.elapsed());
    }
    Ok(())
}

/// Helper function to format and print an evaluation report
fn print_report(report: &EvaluationReport) {
    println!(
        "{}",
        format!(
            "Evaluation on {} held-out pairs ({} customers x {} items in training):",
            report.test_rows, report.train_users, report.train_items
        )
        .bold()
        .blue()
    );

    let best = report.best_by_mae().map(|m| m.model.clone());
    for model in &report.models {
        let marker = if best.as_deref() == Some(model.model.as_str()) {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}", marker, model.model.bold());

        if let Some(error) = &model.error {
            println!("    {}", error.red());
            continue;
        }

        match model.mae {
            Some(mae) => println!("    MAE: {:.4}", mae),
            None => println!("    MAE: {}", "n/a".yellow()),
        }
        println!("    Coverage: {:.1}%", model.coverage * 100.0);
        if let Some(ranking) = &model.ranking {
            println!(
                "    Precision@{k}: {:.4}  Recall@{k}: {:.4}  F1@{k}: {:.4}  ({} customers)",
                ranking.precision,
                ranking.recall,
                ranking.f1,
                ranking.users,
                k = ranking.k
            );
        }
    }
}
