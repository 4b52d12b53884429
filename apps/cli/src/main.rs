use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use wiki2vid_core::{
    ApiConfig, FormController, HttpBackend, Notice, NoticeLevel, VideoBackend,
    default_download_dir, format_status, is_valid_url, parse_article,
};

#[derive(Parser)]
#[command(name = "wiki2vid")]
#[command(about = "Turn Wikipedia articles into videos and track their status")]
struct Cli {
    /// Base URL of the video backend (overrides WIKI2VID_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides WIKI2VID_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a video from a Wikipedia article URL
    Generate {
        /// Wikipedia article URL
        url: String,

        /// Check the video status once it has been generated
        #[arg(short, long)]
        status: bool,

        /// Download the generated video
        #[arg(long)]
        save: bool,

        /// Directory for --save. Defaults to the downloads directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check the processing status of a generated video
    Status {
        /// Video location returned by `generate`
        video: String,
    },
    /// Only validate a Wikipedia article URL
    Check {
        /// Wikipedia article URL
        url: String,
    },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let marker = match notice.level {
            NoticeLevel::Success => style("✓").green().bold(),
            NoticeLevel::Info => style("•").yellow().bold(),
            NoticeLevel::Error => style("✗").red().bold(),
        };
        println!("{} {}", marker, notice.message);
    }
}

fn load_config(cli: &Cli) -> Result<ApiConfig> {
    let mut config = ApiConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_base_url(api_url)?;
    }
    if let Some(secs) = cli.timeout {
        anyhow::ensure!(secs > 0, "--timeout must be positive");
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Validation needs no backend
    if let Command::Check { url } = &cli.command {
        match parse_article(url) {
            Some(article) => {
                println!(
                    "{} {} {}",
                    style("✓").green().bold(),
                    article.title,
                    style(format!("({})", article.lang)).dim()
                );
                return Ok(());
            }
            None => {
                eprintln!(
                    "{} {}",
                    style("Error:").red().bold(),
                    "Please enter a valid Wikipedia URL"
                );
                std::process::exit(1);
            }
        }
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    let backend = HttpBackend::new(config)?;

    println!(
        "\n{}  {}\n",
        style("wiki2vid").cyan().bold(),
        style(backend.config().base_url.as_str()).dim()
    );

    match cli.command {
        Command::Generate {
            url,
            status,
            save,
            out,
        } => run_generate(&backend, url, status, save, out).await,
        Command::Status { video } => run_status(&backend, &video).await,
        Command::Check { .. } => Ok(()),
    }
}

async fn run_generate(
    backend: &HttpBackend,
    url: String,
    check_status: bool,
    save: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut form = FormController::new();
    form.set_input(url);

    let spinner = is_valid_url(&form.state().input_url).then(|| create_spinner("Processing..."));
    // failures are surfaced as notices
    if let Err(e) = form.generate(backend).await {
        tracing::debug!(error = %e, "generation not issued");
    }
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    print_notices(form.take_notices());

    let Some(video_url) = form.state().video_url.clone() else {
        std::process::exit(1);
    };
    let resolved = backend.config().resolve_video(&video_url)?;
    println!("{} {}", style("Video:").dim(), style(resolved).cyan());

    if check_status {
        let spinner = create_spinner("Checking status...");
        if let Err(e) = form.check_status(backend).await {
            tracing::debug!(error = %e, "status check not issued");
        }
        spinner.finish_and_clear();
        print_notices(form.take_notices());
        if let Some(status_text) = &form.state().status_text {
            println!("{}", status_text);
        }
    }

    if save {
        let dest_dir = out.unwrap_or_else(default_download_dir);
        let spinner = create_spinner("Downloading video...");
        let path = backend.download_video(&video_url, &dest_dir).await;
        spinner.finish_and_clear();
        match path {
            Ok(path) => println!(
                "{} {}",
                style("Saved:").dim(),
                style(path.display()).cyan()
            ),
            Err(e) => {
                tracing::error!(error = %e, "video download failed");
                println!("{} Error saving video", style("✗").red().bold());
            }
        }
    }

    Ok(())
}

async fn run_status(backend: &HttpBackend, video: &str) -> Result<()> {
    let spinner = create_spinner("Checking status...");
    let status = backend.video_status(video).await;
    spinner.finish_and_clear();

    match status {
        Ok(status) => {
            println!("{}", format_status(&status));
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "status check failed");
            eprintln!(
                "{} {}",
                style("Error:").red().bold(),
                "Error checking video status"
            );
            std::process::exit(1);
        }
    }
}
