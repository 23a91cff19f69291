use std::fs;
use std::path::PathBuf;

use clap::Parser;

use zonegen::channel::ChannelProjector;
use zonegen::config::{Config, SourceMode};
use zonegen::zone::ZoneAssigner;
use zonegen::{assemble, output, source};

#[derive(Parser, Debug)]
#[command(name = "zonegen")]
#[command(about = "Build OpenGD77 channel and zone lists from RepeaterBook", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(default_value = "zonegen.yaml")]
    config: PathBuf,

    /// Channel table output path
    #[arg(long, default_value = "Channels.csv")]
    channels: PathBuf,

    /// Zone table output path
    #[arg(long, default_value = "Zones.csv")]
    zones: PathBuf,

    /// Raw snapshot path used by modes 'dump' and 'load'
    #[arg(long, default_value = "dump.json")]
    snapshot: PathBuf,

    /// Override the configured source mode
    #[arg(short, long, value_enum)]
    mode: Option<SourceMode>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = Config::load(&args.config)?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    let zones = config.zones()?;

    let repeaters = source::acquire(&config, &args.snapshot)?;
    log::info!("{} eligible repeaters, {} zones", repeaters.len(), zones.len());

    let projector = ChannelProjector::new(config.decimal, config.tg_list.clone());
    let assigner = ZoneAssigner::new(projector);
    let (sequence, buckets) = assigner.assign(&zones, &repeaters);
    let (channels, rows) = assemble::assemble(sequence, &buckets);

    // Render both tables before touching the filesystem so a failure leaves
    // neither file half-written.
    let mut channel_buf = Vec::new();
    output::write_channels(&mut channel_buf, &channels)?;
    let mut zone_buf = Vec::new();
    output::write_zones(&mut zone_buf, &rows)?;

    fs::write(&args.channels, channel_buf)?;
    fs::write(&args.zones, zone_buf)?;

    println!(
        "Wrote {} channels to {} and {} zone rows to {}",
        channels.len(),
        args.channels.display(),
        rows.len(),
        args.zones.display()
    );

    Ok(())
}
