//! Command-line front end for the copywriting session.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use trigger_copy::config::load_config;
use trigger_copy::primitives::{FormField, ImagePayload, SelectedTriggers};
use trigger_copy::session::{CopySession, SessionError};
use trigger_copy::telemetry::{TelemetryConfig, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "trigger-copy", about = "Generate persuasive copy from mental triggers")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "trigger-copy.json")]
    config: PathBuf,

    /// Enable debug logging for the workspace crates.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available mental triggers.
    Triggers,
    /// Store the API key (user_provided credential source only).
    SaveKey {
        /// Gemini API key.
        key: String,
    },
    /// Suggest product, audience and benefit from a product image.
    Analyze {
        /// PNG, JPEG or WEBP image.
        #[arg(long)]
        image: PathBuf,
    },
    /// Generate one snippet per selected trigger.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Product or service name.
    #[arg(long)]
    product: String,
    /// Target audience.
    #[arg(long)]
    audience: String,
    /// Main benefit or transformation.
    #[arg(long)]
    benefit: String,
    /// Optional call to action.
    #[arg(long, default_value = "")]
    cta: String,
    /// Optional product image used as visual inspiration.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Trigger keys (repeatable), see `triggers`.
    #[arg(long = "trigger", short = 't', required = true)]
    triggers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::default().verbose()
    } else {
        TelemetryConfig::default()
    };
    init_tracing(&telemetry)?;

    let config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    debug!(source = ?config.credential_source, model = %config.model, "configuration loaded");
    let session = CopySession::builder_from_config(&config)?.build();

    let outcome = match cli.command {
        Command::Triggers => {
            for trigger in session.catalog().iter() {
                println!("{:<14} {} - {}", trigger.key(), trigger.name(), trigger.description());
            }
            Ok(())
        }
        Command::SaveKey { key } => session.save_credential(&key).await.map(|()| {
            println!("Chave de API salva e pronta para uso.");
        }),
        Command::Analyze { image } => {
            session.set_image(read_image(&image).await?).await;
            session.analyze_image().await.map(|result| {
                println!("Produto: {}", result.product);
                println!("Público-alvo: {}", result.audience);
                println!("Benefício: {}", result.benefit);
            })
        }
        Command::Generate(args) => generate(&session, args).await?,
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn generate(session: &CopySession, args: GenerateArgs) -> Result<Result<(), SessionError>> {
    session.set_field(FormField::Product, args.product).await;
    session.set_field(FormField::Audience, args.audience).await;
    session.set_field(FormField::Benefit, args.benefit).await;
    session.set_field(FormField::Cta, args.cta).await;
    if let Some(path) = args.image {
        session.set_image(read_image(&path).await?).await;
    }
    let selected: SelectedTriggers = args.triggers.into_iter().collect();
    for key in selected.keys() {
        session.toggle_trigger(key.as_str()).await;
    }

    Ok(session.generate_copy().await.map(|items| {
        for item in items {
            println!("## {}\n{}\n", item.trigger_name, item.copy_text);
        }
    }))
}

async fn read_image(path: &Path) -> Result<ImagePayload> {
    let mime_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => bail!("unsupported image type: {} (use PNG, JPG or WEBP)", path.display()),
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(ImagePayload::from_bytes(&bytes, mime_type)?)
}
