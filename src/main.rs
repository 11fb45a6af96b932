//! Subburn - download a video, translate its subtitles and burn them in
//!
//! Without arguments the program asks for a video URL and runs the full pipeline
//! with the default configuration.

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subburn::cli::{Args, Commands};
use subburn::config::Config;
use subburn::error::SubburnError;
use subburn::language::LanguagePriority;
use subburn::organizer::ArtifactOutcome;
use subburn::workflow::{RunMode, RunSummary, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Subburn");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    args.apply_overrides(&mut config);

    let work_dir = match &args.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&work_dir)?;

    match args.command {
        None => {
            let url = prompt_url()?;
            run_pipeline(config, &work_dir, &url, RunMode::Full).await?;
        }
        Some(Commands::Run { url, no_burn }) => {
            if no_burn {
                config.media.burn_subtitles = false;
            }
            run_pipeline(config, &work_dir, &url, RunMode::Full).await?;
        }
        Some(Commands::Subs { url }) => {
            run_pipeline(config, &work_dir, &url, RunMode::SubtitlesOnly).await?;
        }
        Some(Commands::Translate { input, output, source_lang }) => {
            info!("Translating subtitles: {}", input.display());

            let workflow = Workflow::new(config, &work_dir)?;
            let (output, report) = workflow
                .translate_file(&input, output.as_deref(), source_lang.as_deref())
                .await?;

            println!("Translated subtitle saved as: {}", output.display());
            if report.failed() > 0 {
                println!("{} entries could not be translated", report.failed());
            }
        }
        Some(Commands::Embed { video, subtitles, output }) => {
            info!("Embedding subtitles into video: {}", video.display());

            let workflow = Workflow::new(config, &work_dir)?;
            workflow.embed_subtitles(&video, &subtitles, &output).await?;
            println!("Video with subtitles saved as: {}", output.display());
        }
        Some(Commands::InitConfig { path }) => {
            Config::default().save_to_file(&path)?;
            println!("Default configuration written to {}", path.display());
        }
    }

    info!("Subburn finished");
    Ok(())
}

async fn run_pipeline(config: Config, work_dir: &Path, url: &str, mode: RunMode) -> Result<()> {
    let priority = config.priority();
    let workflow = Workflow::new(config, work_dir)?;

    finish_run(workflow.run(url, mode).await, &priority)
}

/// Print the outcome of a pipeline run. Missing subtitles end the run cleanly.
fn finish_run(result: subburn::error::Result<RunSummary>, priority: &LanguagePriority) -> Result<()> {
    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(SubburnError::NoSubtitles) => {
            println!("{}", no_subtitles_message(priority));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_url() -> Result<String> {
    print!("Enter video URL: ");
    std::io::stdout().flush()?;

    let mut url = String::new();
    std::io::stdin().read_line(&mut url)?;
    let url = url.trim().to_string();
    if url.is_empty() {
        return Err(SubburnError::Config("No video URL given".to_string()).into());
    }
    Ok(url)
}

fn print_summary(summary: &RunSummary) {
    println!("\nFound subtitle language: {}", summary.source_language);
    if summary.translation.failed() > 0 {
        println!(
            "{} of {} entries could not be translated",
            summary.translation.failed(),
            summary.translation.outcomes.len()
        );
    }

    print_path("Video", summary.video.as_ref());
    print_path("Translated subtitle", summary.translated_subtitle.as_ref());
    print_path("Video with subtitles", summary.output_video.as_ref());

    for failure in summary.organize.failures() {
        if let ArtifactOutcome::Failed(reason) = &failure.outcome {
            println!("Could not move {} {}: {}", failure.kind, failure.source.display(), reason);
        }
    }
}

fn print_path(label: &str, path: Option<&PathBuf>) {
    if let Some(path) = path {
        println!("{}: {}", label, path.display());
    }
}

/// "No Chinese or English subtitles found!" for the default priority list
fn no_subtitles_message(priority: &LanguagePriority) -> String {
    let names: Vec<&str> = priority
        .entries()
        .iter()
        .map(|entry| match entry.canonical.as_str() {
            "zh-cn" => "Chinese",
            "en" => "English",
            other => other,
        })
        .collect();
    format!("No {} subtitles found!", names.join(" or "))
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let app_dir = std::env::current_dir()?.join(".subburn");
    let log_dir = app_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subburn.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subburn.log").display());

    Ok(())
}
