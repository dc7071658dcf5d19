mod api;
mod gateway;

use clap::{Parser, Subcommand};
use prompter_channels::{discord::DiscordChannel, Outbox};
use prompter_core::{
    config::{self, BotConfig, Config, SystemEnv},
    template,
    traits::{Channel, Provider},
};
use prompter_prompts::{
    google::{oauth, ClientCredentials},
    PromptStore,
};
use prompter_providers::GeminiProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "prompter",
    version,
    about = "Discord bot that answers mentions through a prompt template and Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and answer mentions.
    Start,
    /// Show the configuration summary and check Gemini availability.
    Status,
    /// Run one generation with the current prompt template.
    Ask {
        /// The question to fill into the template.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// List models that can serve generateContent for the configured key.
    Models,
    /// Authorize read access to the Google Doc holding the prompt.
    Authorize {
        /// Authorization code from the consent page. Without it, print the URL.
        #[arg(long)]
        code: Option<String>,
    },
    /// Load the prompt template and print it.
    Prompt,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let cfg = config::load_with_env(&cli.config, &SystemEnv)?;
    let _log_guard = init_logging(&cfg.bot);

    match cli.command {
        Commands::Start => start(cfg).await?,
        Commands::Status => status(&cli.config, &cfg).await,
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: prompter ask <message>");
            }
            let question = message.join(" ");

            let prompts = PromptStore::from_config(&cfg.prompt);
            if let Err(e) = prompts.load().await {
                warn!("using fallback prompt: {e}");
            }
            let provider = build_provider(&cfg)?;
            let prompt = template::fill(&prompts.current(), &question);
            let answer = provider.generate(&prompt).await?;
            println!("{answer}");
        }
        Commands::Models => {
            let provider = build_provider(&cfg)?;
            let models = provider.list_models().await?;
            if models.is_empty() {
                println!("No models support generateContent for this key.");
            }
            for model in models {
                let marker = if model.name == cfg.provider.gemini.model {
                    "*"
                } else {
                    " "
                };
                match model.display_name {
                    Some(display) => println!("{marker} {}  ({display})", model.name),
                    None => println!("{marker} {}", model.name),
                }
            }
        }
        Commands::Authorize { code } => {
            let credentials_path = Path::new(&cfg.prompt.credentials_path);
            match code {
                None => {
                    let creds = ClientCredentials::load(credentials_path).await?;
                    println!("Open this URL, approve access, then run");
                    println!("  prompter authorize --code <CODE>\n");
                    println!("{}", oauth::authorization_url(&creds)?);
                }
                Some(code) => {
                    let saved = oauth::authorize_with_code(
                        credentials_path,
                        &cfg.prompt.token_path(),
                        &code,
                    )
                    .await?;
                    println!("Token saved to {}", saved.display());
                }
            }
        }
        Commands::Prompt => {
            let prompts = PromptStore::from_config(&cfg.prompt);
            if let Err(e) = prompts.load().await {
                eprintln!("{} failed ({e}); showing the fallback template.\n", prompts.describe());
            }
            let current = prompts.current();
            if !template::has_placeholder(&current) {
                eprintln!("note: template has no {} placeholder\n", template::PLACEHOLDER);
            }
            println!("{current}");
        }
    }

    Ok(())
}

async fn start(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;

    let prompts = Arc::new(PromptStore::from_config(&cfg.prompt));
    if let Err(e) = prompts.load().await {
        warn!("starting with the fallback prompt: {e}");
    }

    let provider: Arc<dyn Provider> = Arc::new(build_provider(&cfg)?);
    let channel: Arc<dyn Channel> = Arc::new(DiscordChannel::new(cfg.channel.discord.clone()));
    let outbox = Outbox::new(channel, cfg.messages.fallback_notice.clone());

    let api_handle = if cfg.api.enabled {
        let state = api::ApiState::new(&cfg.bot.name, provider.model(), prompts.describe());
        let api_cfg = cfg.api.clone();
        Some(tokio::spawn(async move {
            api::serve(api_cfg, state).await;
        }))
    } else {
        None
    };

    info!("{} starting...", cfg.bot.name);
    let gw = Arc::new(gateway::Gateway::new(
        provider,
        outbox,
        prompts,
        cfg.messages.clone(),
    ));
    let result = gw.run().await;

    if let Some(h) = api_handle {
        h.abort();
    }
    result
}

async fn status(config_path: &str, cfg: &Config) {
    let gemini = &cfg.provider.gemini;
    println!("{} - Status Check\n", cfg.bot.name);
    println!("Config: {config_path}");
    println!(
        "  discord token:  {}",
        configured(&cfg.channel.discord.bot_token)
    );
    println!("  gemini key:     {}", configured(&gemini.api_key));
    println!("  model:          {} (fallback {})", gemini.model, gemini.fallback_model);
    println!(
        "  prompt:         {} ({})",
        cfg.prompt.mode().display_name(),
        PromptStore::from_config(&cfg.prompt).describe()
    );
    if cfg.api.enabled {
        println!("  health api:     {}:{}", cfg.api.host, cfg.api.port);
    } else {
        println!("  health api:     disabled");
    }
    println!();

    if gemini.api_key.trim().is_empty() {
        println!("  gemini: skipped (no API key)");
        return;
    }
    let provider = GeminiProvider::from_config(gemini.clone());
    println!(
        "  gemini: {}",
        if provider.is_available().await {
            "available"
        } else {
            "unreachable"
        }
    );
}

fn configured(secret: &str) -> &'static str {
    if secret.trim().is_empty() {
        "missing"
    } else {
        "configured"
    }
}

/// Build the Gemini client. Fails when no API key is configured.
fn build_provider(cfg: &Config) -> anyhow::Result<GeminiProvider> {
    if cfg.provider.gemini.api_key.trim().is_empty() {
        anyhow::bail!("Gemini API key is empty. Set it in config.toml or the GEMINI_API_KEY env var.");
    }
    Ok(GeminiProvider::from_config(cfg.provider.gemini.clone()))
}

/// Stdout logging, plus a daily-rolled file when `log_dir` is set.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(bot: &BotConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&bot.log_level));

    let (file_layer, guard) = if bot.log_dir.trim().is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&bot.log_dir, "prompter.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}
