//! gyroscratch — command line entry point.

use std::path::PathBuf;

use clap::Parser;
use log::error;

use gyroscratch::app::{run, AppConfig};

/// Gyroscope scratch controller: rotation → MIDI notes + color feedback.
#[derive(Parser, Debug)]
#[command(name = "gyroscratch", version, about)]
struct Cli {
    /// Prefer the MIDI output port whose name contains this text
    #[arg(long, default_value = "gyroscratch")]
    port: String,

    /// MIDI channel (0-15)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=15))]
    channel: u8,

    /// Note velocity (0-127)
    #[arg(long, default_value_t = scratch_core::DEFAULT_VELOCITY,
          value_parser = clap::value_parser!(u8).range(0..=127))]
    velocity: u8,

    /// Connect to the instrument at startup
    #[arg(long)]
    connect: bool,

    /// Replay a recorded `timestamp_ns,x,y,z` CSV instead of the simulator
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Run without a window (needs --replay)
    #[arg(long, requires = "replay")]
    headless: bool,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        AppConfig {
            port_hint: cli.port,
            channel:   cli.channel,
            velocity:  cli.velocity,
            connect:   cli.connect,
            replay:    cli.replay,
            headless:  cli.headless,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = AppConfig::from(Cli::parse());

    println!();
    println!("╔══════════════════════════════════════════════╗");
    println!("║     Gyro Scratch — rotation to MIDI notes    ║");
    println!("╚══════════════════════════════════════════════╝");
    println!();
    match (&cfg.replay, cfg.headless) {
        (Some(p), true)  => println!("  Source: {} (headless)", p.display()),
        (Some(p), false) => println!("  Source: {}", p.display()),
        (None, _)        => println!("  Source: keyboard simulation (←/→ to spin)"),
    }
    println!();

    if let Err(e) = run(cfg) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
