use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Europe::Paris;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use rivoli_counter::config::{BotConfig, CounterConfig};
use rivoli_counter::fetch::{dump_series, load_series, CounterClient};
use rivoli_counter::publish::{OpsNotifier, Output, Publisher};
use rivoli_counter::series::parse_dmy;
use rivoli_counter::{build_message, CountSeries, EventPipeline, Hashtag, TargetDay};

#[derive(Parser)]
#[command(name = "rivoli-counter", about = "Daily bicycle counter digest")]
struct Cli {
    /// TOML config file (defaults to $BOT_CONFIG_PATH, then config/bot.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a message from a local CSV or JSON snapshot
    Message(MessageArgs),
    /// Download a counter's daily series into a CSV or JSON file
    Fetch(FetchArgs),
    /// Fetch, build yesterday's message, publish it and report to the ops channel
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct MessageArgs {
    #[arg(long, short)]
    input: PathBuf,
    /// last, random or a DD/MM/YYYY date
    #[arg(long, short = 'd', default_value = "last")]
    target_day: String,
    /// DD/MM/YYYY, defaults to today in Paris
    #[arg(long)]
    publish_day: Option<String>,
    #[arg(long)]
    counter: Option<String>,
    #[arg(long)]
    hashtag: Option<String>,
    #[arg(long, short, default_value = "std")]
    output: Output,
    /// Slack webhook, overrides the counter's one
    #[arg(long)]
    slack_url: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    month_record: bool,
}

#[derive(Args, Debug, Clone)]
struct FetchArgs {
    #[arg(long)]
    counter: String,
    #[arg(long, short)]
    output: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[arg(long)]
    counter: String,
    #[arg(long, short, default_value = "slack")]
    output: Output,
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, config_path) = BotConfig::load(cli.config)?;
    debug!(path = ?config_path, "loaded config");

    match cli.command {
        Command::Message(args) => run_message(args, &config).await,
        Command::Fetch(args) => run_fetch(args, &config).await,
        Command::Run(args) => run_daily(args, &config).await,
    }
}

async fn run_message(args: MessageArgs, config: &BotConfig) -> Result<(), String> {
    let counter = find_counter(config, args.counter.as_deref())?;
    let series = load_series(&args.input)?;
    info!(input = %args.input.display(), days = series.len(), "loaded series");

    let mut rng = build_rng(args.seed.or_else(|| counter.and_then(|counter| counter.seed)));
    let target = TargetDay::parse(&args.target_day).map_err(|err| err.to_string())?;
    let day = target
        .resolve(&series, &mut rng)
        .map_err(|err| err.to_string())?;
    let publish_day = match args.publish_day {
        Some(value) => parse_dmy(&value).map_err(|err| err.to_string())?,
        None => today_in_paris(),
    };

    let hashtag = resolve_hashtag(args.hashtag.as_deref(), counter)?;
    let pipeline = build_pipeline(config, args.month_record);
    let message = build_message(day, &series, publish_day, hashtag.as_ref(), &pipeline, &mut rng)
        .map_err(|err| err.to_string())?;

    let publisher =
        Publisher::for_counter(args.output, counter, config, args.slack_url.as_deref())?;
    publisher.publish(&message).await
}

async fn run_fetch(args: FetchArgs, config: &BotConfig) -> Result<(), String> {
    let counter = require_counter(config, &args.counter)?;
    let series = fetch_counter(counter, config).await?;
    dump_series(&series, &args.output)?;
    info!(output = %args.output.display(), days = series.len(), "wrote series");
    Ok(())
}

async fn run_daily(args: RunArgs, config: &BotConfig) -> Result<(), String> {
    let notifier = OpsNotifier::from_config(config);
    let label = format!(
        "run(counter={}, output={})",
        args.counter,
        args.output.as_str()
    );
    if !notifier.is_enabled() {
        debug!("no ops channel configured, run reports stay local");
    }

    match publish_yesterday(&args, config).await {
        Ok(()) => {
            info!(%label, "daily run succeeded");
            notifier
                .notify(&format!("Successfully executed {}", label))
                .await
        }
        Err(err) => {
            error!(%label, error = %err, "daily run failed");
            if let Err(notify_err) = notifier
                .notify(&format!("Failed executing {}\n{}", label, err))
                .await
            {
                warn!(error = %notify_err, "failed to notify ops channel");
            }
            Err(err)
        }
    }
}

async fn publish_yesterday(args: &RunArgs, config: &BotConfig) -> Result<(), String> {
    let counter = require_counter(config, &args.counter)?;
    let publisher = Publisher::for_counter(args.output, Some(counter), config, None)?;

    let series = fetch_counter(counter, config).await?;
    let publish_day = today_in_paris();
    let day = publish_day - Duration::days(1);

    let mut rng = build_rng(args.seed.or(counter.seed));
    let hashtag = resolve_hashtag(None, Some(counter))?;
    let pipeline = build_pipeline(config, false);
    let message = build_message(day, &series, publish_day, hashtag.as_ref(), &pipeline, &mut rng)
        .map_err(|err| err.to_string())?;

    publisher.publish(&message).await
}

async fn fetch_counter(counter: &CounterConfig, config: &BotConfig) -> Result<CountSeries, String> {
    let client = CounterClient::from_config(config)?;
    client.fetch_series(&counter.counter_id).await
}

fn find_counter<'a>(
    config: &'a BotConfig,
    name: Option<&str>,
) -> Result<Option<&'a CounterConfig>, String> {
    match name {
        Some(name) => require_counter(config, name).map(Some),
        None => Ok(None),
    }
}

fn require_counter<'a>(config: &'a BotConfig, name: &str) -> Result<&'a CounterConfig, String> {
    config.counter(name).ok_or_else(|| {
        format!(
            "unknown counter {} (known: {})",
            name,
            config.counter_names().join(", ")
        )
    })
}

fn resolve_hashtag(
    explicit: Option<&str>,
    counter: Option<&CounterConfig>,
) -> Result<Option<Hashtag>, String> {
    explicit
        .map(str::to_string)
        .or_else(|| counter.and_then(|counter| counter.hashtag.clone()))
        .map(|value| Hashtag::new(value).map_err(|err| err.to_string()))
        .transpose()
}

fn build_pipeline(config: &BotConfig, month_record: bool) -> EventPipeline {
    if month_record || config.selection.month_record {
        EventPipeline::extended()
    } else {
        EventPipeline::default()
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn today_in_paris() -> NaiveDate {
    Utc::now().with_timezone(&Paris).date_naive()
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
