use clap::Parser;
use scan2deck::batch::BatchDriver;
use scan2deck::cli::{Args, Command};
use scan2deck::config::Config;
use scan2deck::convert::{convert_pdf, ConvertOptions};
use scan2deck::engines::EngineRegistry;
use scan2deck::preprocessing::Pipeline;
use scan2deck::server::{self, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::try_from(&args)?;

    tracing::info!("Starting scan2deck v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Serve {
            host,
            port,
            max_file_size,
        } => {
            tracing::info!("Binding to {}:{}", host, port);
            let server_config = ServerConfig {
                host,
                port,
                max_file_size,
                default_language: config.language.clone(),
            };
            server::run(&config, server_config).await
        }
        Command::Convert {
            pdf,
            output,
            text_dir,
        } => {
            let registry = EngineRegistry::new(&config)?;
            let engine = registry.select(config.engine.as_deref())?;
            let pipeline = Pipeline::new(config.pipeline.clone())?;

            let report = convert_pdf(
                &pdf,
                &output,
                &pipeline,
                engine.as_ref(),
                &ConvertOptions { text_dir },
            )?;
            tracing::info!(
                "Wrote {} slide(s) from {} image(s) in {}ms",
                report.slides,
                report.images_extracted,
                report.processing_time_ms
            );
            for (file_name, err) in report.batch.failed() {
                tracing::warn!("Left out {}: {}", file_name, err.message);
            }
            Ok(())
        }
        Command::Batch { dir, text_dir } => {
            let registry = EngineRegistry::new(&config)?;
            let engine = registry.select(config.engine.as_deref())?;
            let pipeline = Pipeline::new(config.pipeline.clone())?;

            let mut driver = BatchDriver::new(&pipeline, engine.as_ref());
            if let Some(text_dir) = text_dir {
                driver = driver.with_text_dir(text_dir);
            }
            let report = driver.run(&dir)?;

            if report.is_empty() {
                tracing::warn!("No images found in {}", dir.display());
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
