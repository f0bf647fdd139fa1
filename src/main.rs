use anyhow::Context;
use longread_tts::domain::narration::{JobStatus, NarrationService, NarrationServiceApi};
use longread_tts::error::AppError;
use longread_tts::infrastructure::config::{Config, LogFormat, TtsProvider};
use longread_tts::infrastructure::output::write_narration;
use longread_tts::infrastructure::repositories::{
    OpenAiTtsRepository, PollyTtsRepository, TtsRepository,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: longread-tts <text_file_path>");
        std::process::exit(1);
    }

    if let Err(err) = run(Path::new(&args[1])).await {
        let exit_code = err
            .downcast_ref::<AppError>()
            .map(AppError::exit_code)
            .unwrap_or(1);
        tracing::error!(error = %format!("{:#}", err), "Narration failed");
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code);
    }
}

async fn run(text_file_path: &Path) -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);
    tracing::info!(provider = ?config.tts_provider, "Loaded environment variables");

    // Create the TTS provider
    let tts_repo = create_tts_repository(&config).await?;

    let service = NarrationService::new(tts_repo, config.narration_settings())
        .map_err(AppError::from)?;

    // Ctrl-C cancels the job; already-synthesized segments are discarded
    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling narration");
            cancel.cancel();
        }
    });

    // Load the text file
    let text = tokio::fs::read_to_string(text_file_path)
        .await
        .map_err(AppError::from)
        .with_context(|| format!("reading {}", text_file_path.display()))?;
    tracing::info!(path = %text_file_path.display(), text_length = text.chars().count(), "Loaded text file");

    let report = service.narrate(&text).await.map_err(AppError::from)?;

    let stem = text_file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("narration");
    let audio_path = write_narration(&config.output_dir, stem, &report).await?;

    match report.status {
        JobStatus::Complete => tracing::info!(
            path = %audio_path.display(),
            segment_count = report.segment_count,
            "Narration complete"
        ),
        JobStatus::Partial => tracing::warn!(
            path = %audio_path.display(),
            segment_count = report.segment_count,
            failed_indices = ?report.failed.iter().map(|f| f.index).collect::<Vec<_>>(),
            "Narration saved with missing segments"
        ),
    }

    Ok(())
}

async fn create_tts_repository(config: &Config) -> anyhow::Result<Arc<dyn TtsRepository>> {
    match config.tts_provider {
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is not set")?;
            tracing::info!(model = %config.tts_model, voice = %config.tts_voice, "OpenAI TTS client initialized");
            let repo: Arc<dyn TtsRepository> = Arc::new(OpenAiTtsRepository::from_api_key(api_key));
            Ok(repo)
        }
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;

            // Log AWS config details (without exposing credentials)
            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = aws_sdk_polly::Client::new(&aws_config);
            let repo: Arc<dyn TtsRepository> = Arc::new(PollyTtsRepository::new(Arc::new(polly_client)));
            Ok(repo)
        }
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "longread_tts=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "longread_tts=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
