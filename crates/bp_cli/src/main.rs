use anyhow::Context;
use bp_core::{Article, Clock, GenerationRequest, SystemClock, TextModel};
use bp_inference::models::{create_model, ModelProvider};
use bp_inference::{ArticleGenerator, Config, DEFAULT_BASE_URL, DEFAULT_MODEL_NAME};
use bp_publisher::logging::parse_level;
use bp_publisher::{
    init_logging, BatchGenerator, HttpPublishTarget, PublicationScheduler, PublishingService, SettingsService,
    TickOutcome,
};
use bp_storage::Stores;
use bp_web::AppState;
use clap::Parser;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                c if c.is_whitespace() => continue,
                c => return Err(format!("Invalid duration unit: {}", c)),
            };
            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Missing number before '{}'", c))?;
            total_seconds = num
                .checked_mul(unit)
                .and_then(|seconds| total_seconds.checked_add(seconds))
                .ok_or_else(|| "Duration is too large".to_string())?;
            current_number.clear();
            has_value = true;
        }

        // A trailing bare number counts as seconds.
        if !current_number.is_empty() {
            let seconds = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(seconds)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

/// `KEYWORD=URL` as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeywordPair(GenerationRequest);

impl FromStr for KeywordPair {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (keyword, url) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected KEYWORD=URL, got '{}'", s))?;
        Ok(KeywordPair(GenerationRequest::new(keyword, url)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "bp", author, version, about = "Generate, queue and publish blog articles", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "BP_STORAGE", default_value = "memory")]
    storage: String,
    /// Backend location, e.g. a SQLite file path
    #[arg(long, env = "BP_DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "BP_MODEL", default_value = "gemini", help = "Model to use for generation. Available models: gemini (default), dummy")]
    model: ModelProvider,
    #[arg(long, env = "BP_MODEL_NAME", default_value = DEFAULT_MODEL_NAME)]
    model_name: String,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Upper bound for a single model call (e.g. 60s, 2m)
    #[arg(long, env = "BP_MODEL_TIMEOUT", default_value = "60s")]
    model_timeout: HumanDuration,
    /// Pause between two generations of a batch
    #[arg(long, env = "BP_REQUEST_DELAY", default_value = "2s")]
    request_delay: HumanDuration,
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API with the scheduler in the background
    Serve {
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
        #[arg(long, env = "BP_TICK_PERIOD", default_value = "1m")]
        tick_period: HumanDuration,
    },
    /// Generate one article per KEYWORD=URL pair and queue them
    Generate {
        #[arg(long = "pair", value_name = "KEYWORD=URL", required = true)]
        pairs: Vec<KeywordPair>,
    },
    /// Run a single scheduler tick
    Tick,
    /// Run the scheduler until interrupted (e.g. 1m, 30s, 1h15m)
    Scheduler {
        #[arg(long, env = "BP_TICK_PERIOD", default_value = "1m")]
        period: HumanDuration,
    },
    /// Publish an article now, skipping the queue
    Publish { id: String },
    /// Send an article to an external site
    PublishToTarget {
        id: String,
        /// Defaults to the target URL from the settings
        #[arg(long)]
        destination: Option<String>,
    },
    /// Print stored articles as JSON
    List {
        #[arg(long)]
        published: bool,
    },
}

/// Everything a command may need, wired from one set of stores.
struct Services {
    batch: BatchGenerator,
    publishing: PublishingService,
    settings: SettingsService,
    scheduler: PublicationScheduler,
}

fn build_services(cli: &Cli, stores: Stores) -> anyhow::Result<Services> {
    let config = Config {
        provider: cli.model,
        api_key: cli.api_key.clone(),
        model_name: cli.model_name.clone(),
        base_url: DEFAULT_BASE_URL.to_string(),
        request_timeout: cli.model_timeout.0,
    };
    let model = create_model(&config)?;
    info!("🧠 Model initialized (using {})", model.name());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let generator = Arc::new(ArticleGenerator::new(model).with_timeout(cli.model_timeout.0));
    let settings = SettingsService::new(stores.settings.clone());
    let target = Arc::new(HttpPublishTarget::new()?);

    Ok(Services {
        batch: BatchGenerator::new(generator, stores.articles.clone()).with_request_delay(cli.request_delay.0),
        publishing: PublishingService::new(stores.articles.clone(), settings.clone(), target, clock.clone()),
        scheduler: PublicationScheduler::new(stores.articles, settings.clone(), clock),
        settings,
    })
}

fn print_articles(articles: &[Article]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(articles)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(parse_level(&cli.log_level)?);

    let stores = bp_storage::create_storage(&cli.storage, cli.database_url.as_deref())
        .await
        .with_context(|| format!("opening {} storage", cli.storage))?;
    info!("💾 Storage initialized (using {})", cli.storage);

    let services = build_services(&cli, stores)?;

    match cli.command {
        Commands::Serve { port, tick_period } => {
            let scheduler = services.scheduler.with_period(tick_period.0).spawn();
            let state = AppState {
                batch: services.batch,
                publishing: services.publishing,
                settings: services.settings,
            };
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let served = bp_web::serve(state, addr).await;
            scheduler.abort();
            served?;
        }
        Commands::Generate { pairs } => {
            let requests: Vec<GenerationRequest> = pairs.into_iter().map(|p| p.0).collect();
            let created = services.batch.generate_batch(&requests).await?;
            print_articles(&created)?;
        }
        Commands::Tick => match services.scheduler.tick().await? {
            TickOutcome::EmptyQueue => println!("Nothing queued"),
            TickOutcome::Gated { elapsed_minutes, required_minutes } => println!(
                "Last publication {:.1} minutes ago, waiting for {} minutes",
                elapsed_minutes, required_minutes
            ),
            TickOutcome::Promoted(article) => println!("Published {} ({})", article.title, article.id),
        },
        Commands::Scheduler { period } => {
            let policy = services.settings.policy().await?;
            info!("Minimum interval between publications: {} minutes", policy.minimum_interval_minutes);
            services
                .scheduler
                .with_period(period.0)
                .run_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
        }
        Commands::Publish { id } => {
            let article = services.publishing.publish_now(&id).await?;
            print_articles(&[article])?;
        }
        Commands::PublishToTarget { id, destination } => {
            let article = services.publishing.publish_to_target(&id, destination.as_deref()).await?;
            print_articles(&[article])?;
        }
        Commands::List { published } => {
            let articles = if published {
                services.publishing.list_published().await?
            } else {
                services.publishing.list_all().await?
            };
            print_articles(&articles)?;
        }
    }

    Ok(())
}
