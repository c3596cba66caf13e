use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use v8_harness::config::Profile;
use v8_harness::session::{self, LaunchMode};
use v8_harness::{delivery, parser};

#[derive(Parser)]
#[command(name = "v8-harness")]
#[command(about = "Launch the d8 challenge target and feed it a normalized JS payload", long_about = None)]
struct Cli {
    /// Target binary (d8)
    #[arg(long = "bin")]
    bin: Option<PathBuf>,

    /// JS payload to normalize and send
    #[arg(long)]
    js: Option<PathBuf>,

    /// Connect to the remote service instead of running locally
    #[arg(long, conflicts_with = "gdb")]
    remote: bool,

    /// Run the target under gdbserver and open gdb in a terminal
    #[arg(long)]
    gdb: bool,

    /// Print the normalized payload and exit
    #[arg(long)]
    sl: bool,

    /// JSON profile with target and launch settings
    #[arg(long)]
    profile: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// I/O timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn mode(&self) -> LaunchMode {
        if self.remote {
            LaunchMode::Remote
        } else if self.gdb {
            LaunchMode::Gdb
        } else {
            LaunchMode::Local
        }
    }

    fn profile(&self) -> anyhow::Result<Profile> {
        let mut profile = match &self.profile {
            Some(path) => Profile::load(path)
                .with_context(|| format!("loading profile {}", path.display()))?,
            None => Profile::default(),
        };
        if let Some(bin) = &self.bin {
            profile.binary = Some(bin.clone());
        }
        if let Some(host) = &self.host {
            profile.host = host.clone();
        }
        if let Some(port) = self.port {
            profile.port = port;
        }
        if let Some(timeout) = self.timeout {
            profile.timeout_secs = timeout;
        }
        Ok(profile)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let profile = cli.profile()?;
    let mode = cli.mode();
    debug!("mode {:?}, profile {:?}", mode, profile);

    let mut tube = session::start(mode, &profile).context("starting target")?;

    if let Some(js_path) = &cli.js {
        let script = parser::normalize_file(js_path)
            .with_context(|| format!("normalizing {}", js_path.display()))?;
        if let Some(line) = script.stopped_at_exit {
            info!("payload cut at EXIT on line {}", line);
        }

        if mode == LaunchMode::Remote {
            delivery::deliver_remote(&mut tube, &script, profile.remote_delay())?;
            tube.interactive()?;
            return Ok(());
        }
        if cli.sl {
            println!("{}", script.text);
            return Ok(());
        }
        delivery::deliver(&mut tube, mode, &script, profile.remote_delay())?;
    }

    tube.interactive()?;
    Ok(())
}
