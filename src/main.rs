use std::net::Ipv4Addr;
use std::sync::Arc;

use anthocnet::address::Address;
use anthocnet::config::{Config, ANTHOCNET_PORT};
use anthocnet::facade::ProtocolFacade;
use anthocnet::host::tokio_host::{SystemClock, ThreadRandomSource, TokioNetwork, TokioScheduler};
use anthocnet::host::traits::{Clock, Network};
use anthocnet::timers::{dispatch_outcomes, TimerLoop};
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "anthocnet")]
#[command(about = "AntHocNet pheromone routing for mobile ad-hoc networks")]
struct Args {
    /// This node's IPv4 address, also used as its routing identity.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: Ipv4Addr,

    /// UDP port carrying control traffic.
    #[arg(short, long, default_value_t = ANTHOCNET_PORT)]
    port: u16,

    /// Optional JSON config file overriding the documented defaults.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anthocnet::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("anthocnet={log_level}"))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.ant_port = args.port;
    config.validate()?;

    info!(node = %args.address, port = args.port, "AntHocNet node starting");

    let broadcast = std::net::SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::BROADCAST), args.port);
    let network = Arc::new(TokioNetwork::bind(&[(0, args.address, broadcast)], args.port).await?);
    let (scheduler_impl, mut timer_rx) = TokioScheduler::new();
    let scheduler = Arc::new(scheduler_impl);
    let clock = Arc::new(SystemClock::new());
    let rng = Arc::new(ThreadRandomSource::new());

    let facade = Arc::new(Mutex::new(ProtocolFacade::<Vec<u8>>::new(
        Address(args.address),
        config,
    )));

    let (inbound_tx, mut inbound_rx) = tokio::sync::mpsc::unbounded_channel();
    network.spawn_receivers(inbound_tx);

    let timer_loop = Arc::new(TimerLoop::new(
        facade.clone(),
        scheduler.clone(),
        network.clone() as Arc<dyn Network>,
        clock.clone(),
        rng.clone(),
    ));
    timer_loop.start().await;

    let timer_task = {
        let timer_loop = timer_loop.clone();
        tokio::spawn(async move {
            while let Some(tag) = timer_rx.recv().await {
                timer_loop.handle_tag(tag).await;
            }
        })
    };

    let inbound_task = {
        let facade = facade.clone();
        let network = network.clone();
        let clock = clock.clone();
        let rng = rng.clone();
        tokio::spawn(async move {
            while let Some((iface, _from, msg)) = inbound_rx.recv().await {
                let now = clock.now();
                let outcomes = {
                    let mut facade = facade.lock().await;
                    facade.handle_control_message(msg, iface, now, &*rng)
                };
                dispatch_outcomes(&*network, outcomes).await;
            }
        })
    };

    info!("Press Ctrl+C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed waiting for shutdown signal: {e}");
    }
    info!("shutting down");

    timer_task.abort();
    inbound_task.abort();

    Ok(())
}
