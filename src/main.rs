#[macro_use] extern crate log;
extern crate env_logger;

use std::path::PathBuf;

use anyhow::{ Context, Result };
use async_std::channel;
use async_std::channel::Receiver;
use async_std::task;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use autodirector::broadcast::data_producer::SimulatedRace;
use autodirector::config::Config;
use autodirector::director::Director;
use autodirector::session::Session;
use autodirector::sink::{ ChannelSink, FocusCommand };

/// Buffered updates between a telemetry source and its session.
const UPDATE_QUEUE: usize = 256;

#[derive(Debug, Parser)]
#[clap(author, version, about = "Automated camera director for live race broadcasts")]
struct Args {
    /// YAML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Start with auto switching enabled
    #[clap(long)]
    auto: bool,

    /// Seed for the simulated race and the tie-break
    #[clap(long)]
    seed: Option<u64>,

    /// Realtime ticks to simulate per session
    #[clap(long, default_value_t = 2400)]
    ticks: u64,

    /// Independent sessions to run side by side
    #[clap(long, default_value_t = 1)]
    sessions: u16,

    #[clap(short, long)]
    verbose: bool,
}

async fn log_commands(name: String, commands: Receiver<FocusCommand>) -> u64 {
    let mut focused = None;
    let mut received = 0;
    while let Ok(command) = commands.recv().await {
        received += 1;
        match command {
            FocusCommand::SetFocus(car_index) if focused == Some(car_index) => {
                debug!["[{}] car {} is already focused", name, car_index];
            },
            FocusCommand::SetFocus(car_index) => {
                info!["[{}] focus -> car {}", name, car_index];
                focused = Some(car_index);
            },
            other => info!["[{}] {:?}", name, other],
        }
    }
    received
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if args.auto {
        config.director.auto_switch_enabled = true;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    info!("Running {} session(s) with {:?}", args.sessions, config);

    let mut running = Vec::with_capacity(args.sessions as usize);
    for n in 0..args.sessions {
        let name = format!("sim-{}", n);
        let seed = config.simulation.seed.map(|seed| seed.wrapping_add(n as u64));

        let (sender, receiver) = channel::bounded(UPDATE_QUEUE);
        let (sink, commands) = ChannelSink::new(config.sink.queue_capacity);

        let mut director = Director::new(&config.director, Box::new(sink));
        if let Some(seed) = seed {
            director = director.with_rng(Box::new(StdRng::seed_from_u64(seed)));
        }
        let (session, _handle) = Session::new(&name, director, receiver);

        let mut simulation = config.simulation.clone();
        simulation.seed = seed;
        let producer = SimulatedRace::new(sender, simulation).with_tick_limit(args.ticks);

        running.push((
            name.clone(),
            task::spawn(producer.execute()),
            task::spawn(session.run()),
            task::spawn(log_commands(name, commands)),
        ));
    }

    for (name, producer, session, commands) in running {
        let ticks = producer.await;
        let director = session.await;
        let stats = director.stats().clone();
        // closes the command queue
        drop(director);
        let commands = commands.await;

        info!(
            "[{}] {} ticks simulated, {} processed, {} switches, {} failed, {} dropped updates, {} commands",
            name, ticks, stats.ticks, stats.switches, stats.failed_ticks, stats.dropped_updates, commands
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    task::block_on(run(args))
}
