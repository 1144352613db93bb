//! Command-line entry point: submit one text-to-video job and follow
//! it to completion.

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vgen_engine::{Dispatcher, EngineConfig, JobEvent};
use vgen_models::{GenerationRequest, JobState, Provider};

fn usage() -> ! {
    eprintln!("Usage: vgen <provider> <prompt> [aspect_ratio] [duration_secs]");
    eprintln!("Providers: veo, runway, pixverse, vidu");
    std::process::exit(2);
}

fn parse_provider(name: &str) -> Option<Provider> {
    Provider::ALL
        .iter()
        .copied()
        .find(|p| p.as_str() == name.to_lowercase())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vgen=info"));
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
    }
    let Some(provider) = parse_provider(&args[0]) else {
        usage();
    };
    let prompt = args[1].clone();

    let config = EngineConfig::from_env();
    let (dispatcher, mut events) =
        Dispatcher::from_config(&config).context("failed to build dispatcher")?;

    let caps = dispatcher.capabilities(provider)?;
    let aspect_ratio = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| caps.aspect_ratios[0].to_string());
    let duration_secs = match args.get(3) {
        Some(raw) => raw.parse().context("duration must be an integer")?,
        None => caps.durations[0],
    };

    let request = GenerationRequest::from_text(prompt, aspect_ratio, duration_secs);
    let job_id = dispatcher.submit(provider, &request).await?;
    dispatcher.poll(&job_id)?;
    info!(%job_id, %provider, "submitted");

    while let Some(event) = events.recv().await {
        match event {
            JobEvent::Progress {
                state, progress, ..
            } => match progress.value() {
                Some(p) => info!(%state, progress = %format!("{:.0}%", p * 100.0), "waiting"),
                None => info!(%state, "waiting"),
            },
            JobEvent::Terminal { result, .. } => {
                match result.state {
                    JobState::Succeeded => {
                        let url = result.media_url.unwrap_or_default();
                        info!(%url, "generation finished");
                        println!("{url}");
                    }
                    state => {
                        let message = result.error_message.unwrap_or_default();
                        warn!(%state, %message, "generation did not succeed");
                        bail!("job ended in state {state}: {message}");
                    }
                }
                break;
            }
        }
    }

    Ok(())
}
