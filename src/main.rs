use clap::Parser;
use std::io::Read;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transferwatch::application::filter::TransferFilter;
use transferwatch::cli::commands::{Cli, Commands};
use transferwatch::config::interval_from_minutes;
use transferwatch::infrastructure::notify::ChannelListener;
use transferwatch::TransferWatch;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transferwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let tw = match TransferWatch::new() {
        Ok(tw) => tw,
        Err(e) => {
            eprintln!("Error initializing transferwatch: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(tw, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(tw: TransferWatch, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Extract { file, source } => {
            let content = if file == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&file)?
            };
            let records = tw.extract_records(&content, &source);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Score { url } => {
            let score = tw.calculate_confidence_score(&url);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "source": url,
                    "score": score.value(),
                    "tier": score.tier().to_string(),
                }))?
            );
        }
        Commands::Scan {
            urls,
            min_fee,
            clubs,
            min_confidence,
        } => {
            let criteria = TransferFilter {
                min_fee,
                clubs: (!clubs.is_empty()).then_some(clubs),
                min_confidence,
            };
            let urls = (!urls.is_empty()).then_some(urls);
            let report = tw.scan(urls, criteria).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Watch { interval, urls } => {
            let mut config = tw.config().scheduler_config();
            if !urls.is_empty() {
                config.urls = urls;
            }
            let interval = match interval {
                Some(minutes) => interval_from_minutes(minutes)?,
                None => tw.config().interval(),
            };

            let scheduler = tw.scheduler_with(config);
            let (listener, mut rx) = ChannelListener::channel();
            scheduler.add_listener(std::sync::Arc::new(listener));
            scheduler.start(interval);

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            loop {
                tokio::select! {
                    Some(notification) = rx.recv() => {
                        println!("{}", serde_json::to_string(&notification)?);
                    }
                    _ = &mut ctrl_c => {
                        info!("Ctrl-C received, stopping");
                        break;
                    }
                }
            }
            scheduler.shutdown().await;
        }
    }
    Ok(())
}
