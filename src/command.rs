use crate::command::{
    api::{parse_endpoint, ApiClient, DEFAULT_API_ENDPOINT},
    download::download_artifact,
    eula::{accept_eula, is_eula_accepted},
    launch::{parse_memory, run_server, LaunchConfig, ServerExit},
    release::{query_build, Channel, Selection},
};
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::{
    env::current_dir,
    path::{Path, PathBuf},
};
use tracing::{info, subscriber, warn, Level};
use tracing_subscriber::{fmt::writer::MakeWriterExt, FmtSubscriber};
use url::Url;

mod api;
mod download;
mod eula;
mod launch;
mod release;
#[cfg(test)]
mod testing;

#[derive(Debug, Parser)]
#[command(
    name = "papermc",
    author,
    version,
    about = "Downloads and runs the latest build of a PaperMC version, or a specified build"
)]
pub struct Cli {
    /// Version group, e.g. 1.20 instead of 1.20.1
    #[arg(value_name = "VERSION")]
    family: String,

    /// PaperMC build number
    #[arg(long, short)]
    build: Option<u32>,

    /// Pick the latest build from the experimental channel
    #[arg(conflicts_with = "any_channel", default_value_t = false, long, short)]
    experimental: bool,

    /// Pick the latest build from any channel
    #[arg(default_value_t = false, long)]
    any_channel: bool,

    /// Path of the server jar (overwritten unless skipping download)
    #[arg(default_value = "papermc.jar", long, short)]
    filename: PathBuf,

    /// Heap size passed to -Xms and -Xmx
    #[arg(default_value = "4G", long, short, value_parser = parse_memory)]
    memory: String,

    /// Use the currently downloaded jar
    #[arg(default_value_t = false, long)]
    skip_download: bool,

    /// Don't run the jar after download
    #[arg(default_value_t = false, long)]
    skip_execution: bool,

    /// Don't pass Aikar's GC tuning flags
    #[arg(default_value_t = false, long)]
    skip_aikar: bool,

    /// Show the server GUI
    #[arg(default_value_t = false, long)]
    gui: bool,

    /// Java runtime executable
    #[arg(default_value = "java", long)]
    java: PathBuf,

    /// PaperMC project API endpoint
    #[arg(default_value = DEFAULT_API_ENDPOINT, long, value_parser = parse_endpoint)]
    api: Url,

    /// Log level
    #[arg(default_value_t = Level::INFO, long)]
    level: Level,
}

impl Cli {
    fn selection(&self) -> Selection {
        if self.any_channel {
            Selection::AnyChannel
        } else if self.experimental {
            Selection::Channel(Channel::Experimental)
        } else {
            Selection::Channel(Channel::Default)
        }
    }

    fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            java: self.java.clone(),
            memory: self.memory.clone(),
            show_gui: self.gui,
            target: self.filename.clone(),
            use_tuning_flags: !self.skip_aikar,
        }
    }
}

pub fn get_prefix(name: &str) -> String {
    style(format!("{} |>", name)).bold().to_string()
}

async fn execute(cli: &Cli, workdir: &Path) -> Result<()> {
    if cli.skip_download {
        if !cli.filename.exists() {
            warn!("skipping download but {} does not exist", cli.filename.display());
        }
    } else {
        let api = ApiClient::new(cli.api.clone())?;

        let descriptor = query_build(&api, &cli.family, cli.selection(), cli.build).await?;

        println!(
            "{} downloading papermc version {}, build #{}...",
            get_prefix("papermc"),
            style(&descriptor.version).bold(),
            descriptor.build,
        );

        let written = download_artifact(&api, &descriptor, &cli.filename).await?;

        info!("wrote {} bytes to {}", written, cli.filename.display());
    }

    if !is_eula_accepted(workdir).await {
        info!("accepting EULA in {}", workdir.display());
    }

    accept_eula(workdir).await?;

    if cli.skip_execution {
        info!("skipping execution");
        return Ok(());
    }

    match run_server(&cli.launch_config()).await? {
        ServerExit::Exited(status) => info!("server exited: {status}"),
        ServerExit::Interrupted => {
            println!("{} {}", get_prefix("papermc"), style("done!").green())
        }
    }

    Ok(())
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing subscriber

    let subscriber_writer = std::io::stderr.with_max_level(cli.level);

    let mut subscriber = FmtSubscriber::builder()
        .with_max_level(cli.level)
        .with_target(false)
        .with_writer(subscriber_writer)
        .without_time();

    if [Level::DEBUG, Level::TRACE].contains(&cli.level) {
        subscriber = subscriber.with_file(true).with_line_number(true);
    }

    let subscriber = subscriber.finish();

    subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let workdir = current_dir().context("failed to get current directory")?;

    execute(&cli, &workdir).await
}
