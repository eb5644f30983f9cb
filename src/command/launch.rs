use crate::error::{Error, Result};
use std::{
    path::{Path, PathBuf},
    process::ExitStatus,
};
use tokio::{process::Command, signal};
use tracing::{debug, info, warn};

/// G1 tuning flags recommended by Aikar for Paper servers.
///
/// Order matters: `UnlockExperimentalVMOptions` must come before the
/// experimental G1 sizing options that follow it.
pub const AIKAR_FLAGS: &[&str] = &[
    "-XX:+UseG1GC",
    "-XX:+ParallelRefProcEnabled",
    "-XX:MaxGCPauseMillis=200",
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+DisableExplicitGC",
    "-XX:+AlwaysPreTouch",
    "-XX:G1NewSizePercent=30",
    "-XX:G1MaxNewSizePercent=40",
    "-XX:G1HeapRegionSize=8M",
    "-XX:G1ReservePercent=20",
    "-XX:G1HeapWastePercent=5",
    "-XX:G1MixedGCCountTarget=4",
    "-XX:InitiatingHeapOccupancyPercent=15",
    "-XX:G1MixedGCLiveThresholdPercent=90",
    "-XX:G1RSetUpdatingPauseIntervalMillis=5",
    "-XX:SurvivorRatio=32",
    "-XX:+PerfDisableSharedMem",
    "-XX:MaxTenuringThreshold=1",
    "-Dusing.aikars.flags=https://mcflags.emc.gs",
    "-Daikars.new.flags=true",
];

pub const NO_GUI_FLAG: &str = "--nogui";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    pub java: PathBuf,
    pub memory: String,
    pub show_gui: bool,
    pub target: PathBuf,
    pub use_tuning_flags: bool,
}

#[derive(Debug)]
pub enum ServerExit {
    Exited(ExitStatus),
    Interrupted,
}

/// Accepts JVM heap sizes such as `512M`, `4G` or `1048576`.
pub fn parse_memory(value: &str) -> Result<String, String> {
    let digits = value.trim_end_matches(['k', 'K', 'm', 'M', 'g', 'G', 't', 'T']);
    let suffix_len = value.len() - digits.len();

    if digits.is_empty() || suffix_len > 1 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "invalid heap size '{value}': expected a number with an optional K, M, G or T suffix"
        ));
    }

    Ok(value.to_string())
}

/// Assembles the JVM arguments (without the executable itself).
pub fn build_argv(config: &LaunchConfig, jar: &Path) -> Vec<String> {
    let mut argv = vec![
        format!("-Xms{}", config.memory),
        format!("-Xmx{}", config.memory),
    ];

    if config.use_tuning_flags {
        argv.extend(AIKAR_FLAGS.iter().map(|flag| flag.to_string()));
    }

    argv.push("-jar".to_string());
    argv.push(jar.display().to_string());

    if !config.show_gui {
        argv.push(NO_GUI_FLAG.to_string());
    }

    argv
}

/// Runs the server in the foreground with inherited stdio.
///
/// An interrupt while the server is running is forwarded by the terminal to
/// the whole process group, so the server shuts itself down and we only wait
/// for it.
pub async fn run_server(config: &LaunchConfig) -> Result<ServerExit> {
    let argv = build_argv(config, &config.target);

    info!("starting: {} {}", config.java.display(), argv.join(" "));

    let launch_error = |source: std::io::Error| Error::ProcessLaunch {
        program: config.java.clone(),
        source,
    };

    let mut child = Command::new(&config.java)
        .args(&argv)
        .spawn()
        .map_err(launch_error)?;

    // An interrupt that also stopped the server counts as an interrupt.
    tokio::select! {
        biased;

        interrupt = signal::ctrl_c() => {
            if let Err(err) = interrupt {
                warn!("failed to listen for interrupt: {err}");

                let status = child.wait().await.map_err(launch_error)?;

                return Ok(ServerExit::Exited(status));
            }

            match child.wait().await {
                Ok(status) => debug!("server stopped after interrupt: {status}"),
                Err(err) => warn!("failed to wait for server: {err}"),
            }

            Ok(ServerExit::Interrupted)
        }

        status = child.wait() => Ok(ServerExit::Exited(status.map_err(launch_error)?)),
    }
}
