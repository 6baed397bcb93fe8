//! Courier - chat task-orchestration bot
//!
//! Entry point: loads configuration, wires the pipeline and long-polls
//! Telegram until Ctrl-C.

mod telegram;

use anyhow::Context;
use courier_core::config::{load_config, load_from_file, sample_config, CourierConfig};
use courier_core::{DialogueController, Dispatcher};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use telegram::TelegramTransport;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber (only once)
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG")
                    .unwrap_or_else(|_| "courier=info,courier_core=info".into()),
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

/// Command-line arguments
struct Args {
    /// Explicit config file
    config: Option<PathBuf>,
    /// Print a sample config and exit
    sample_config: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut sample_config = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--sample-config" => {
                    sample_config = true;
                }
                _ => {
                    // Ignore unknown flags
                }
            }
        }

        Self {
            config,
            sample_config,
        }
    }
}

fn load(args: &Args) -> courier_core::Result<CourierConfig> {
    let config = match &args.config {
        Some(path) => load_from_file(path)?,
        None => load_config(&std::env::current_dir()?)?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.sample_config {
        print!("{}", sample_config());
        return Ok(());
    }

    init_tracing();
    let config = load(&args).context("failed to load configuration")?;
    let bot_token = config.bot_token()?;

    let controller =
        DialogueController::from_config(&config).context("failed to build the pipeline")?;
    tracing::info!(
        version = courier_core::version(),
        model = %config.llm.model,
        capabilities = ?controller.registry().capabilities(),
        "starting courier"
    );

    let controller = Arc::new(controller);
    let transport = Arc::new(TelegramTransport::new(bot_token, &config.transport));

    Dispatcher::new(controller, transport, config.transport.processing_notice)
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
