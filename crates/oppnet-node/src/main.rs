//! Oppnet Demo Node Runner
//!
//! Runs a self-contained opportunistic-network scenario: a handful of
//! jittering honest nodes, a configurable number of flooders that only
//! ever originate traffic, and the trust subsystem watching the hops.
//! At the end it prints each node's verdict tables as JSON.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use oppnet_core::{Coord, NodeAddress, SimConfigBuilder};
use oppnet_sim::{MessageRouter, MovementModel, Transfer, World};

/// Oppnet demo runner
///
/// A discrete-time opportunistic network with trust-based misbehavior
/// detection: nodes ledger every hop they witness, score their neighbors'
/// forward/receive balance, and refuse connectivity to blacklisted peers.
#[derive(Parser, Debug)]
#[command(name = "oppnet-node")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of honest nodes
    #[arg(long, env = "OPPNET_NODES", default_value = "6")]
    nodes: usize,

    /// Number of misbehaving flooder nodes
    #[arg(long, env = "OPPNET_MALICIOUS", default_value = "1")]
    malicious: usize,

    /// Number of simulation ticks to run
    #[arg(short, long, env = "OPPNET_TICKS", default_value = "300")]
    ticks: u64,

    /// Forward/receive ratio above which a neighbor looks suspicious
    #[arg(long, env = "OPPNET_RATIO_THRESHOLD", default_value = "1.0")]
    ratio_threshold: f64,

    /// Minimum total observations before the ratio is trusted
    #[arg(long, env = "OPPNET_SUM_THRESHOLD", default_value = "5.0")]
    sum_threshold: f64,

    /// Radio range in meters
    #[arg(long, env = "OPPNET_RANGE", default_value = "10.0")]
    range: f64,

    /// Side length of the square world in meters
    #[arg(long, env = "OPPNET_WORLD_SIZE", default_value = "30.0")]
    world_size: f64,

    /// Per-node probability of originating a message each tick
    #[arg(long, env = "OPPNET_TRAFFIC_RATE", default_value = "0.2")]
    traffic_rate: f64,

    /// RNG seed; a fixed seed reproduces the run exactly
    #[arg(short, long, env = "OPPNET_SEED", default_value = "42")]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "OPPNET_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (plain, json)
    #[arg(long, env = "OPPNET_LOG_FORMAT", default_value = "plain")]
    log_format: String,
}

fn setup_logging(log_level: &str, log_format: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    match log_format.to_lowercase().as_str() {
        "json" => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
        _ => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
    }

    Ok(())
}

/// Random walk with per-tick jitter, clamped to the square world.
struct JitterWalk {
    location: Coord,
    step: f64,
    bound: f64,
    rng: StdRng,
}

impl JitterWalk {
    fn new(start: Coord, step: f64, bound: f64, seed: u64) -> Self {
        Self {
            location: start,
            step,
            bound,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MovementModel for JitterWalk {
    fn advance(&mut self, dt: f64) {
        let reach = self.step * dt;
        let dx = self.rng.gen_range(-reach..=reach);
        let dy = self.rng.gen_range(-reach..=reach);
        self.location = Coord::new(
            (self.location.x + dx).clamp(0.0, self.bound),
            (self.location.y + dy).clamp(0.0, self.bound),
        );
    }

    fn location(&self) -> Coord {
        self.location
    }
}

/// Traffic generator for the demo run.
///
/// Honest nodes originate messages to random honest peers; flooders
/// originate at every tick and are never chosen as receivers, so their
/// forward counters grow while their receive counters stay at zero.
struct DemoTraffic {
    honest: Vec<NodeAddress>,
    flooders: Vec<NodeAddress>,
    rate: f64,
    rng: StdRng,
    next_id: u64,
}

impl DemoTraffic {
    fn new(honest: Vec<NodeAddress>, flooders: Vec<NodeAddress>, rate: f64, seed: u64) -> Self {
        Self {
            honest,
            flooders,
            rate: rate.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("M{}", self.next_id)
    }

    fn random_honest(&mut self, excluding: NodeAddress) -> Option<NodeAddress> {
        let pool: Vec<NodeAddress> = self
            .honest
            .iter()
            .copied()
            .filter(|addr| *addr != excluding)
            .collect();
        if pool.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..pool.len());
        Some(pool[pick])
    }
}

impl MessageRouter for DemoTraffic {
    fn deliverable(&mut self, _tick: u64) -> Vec<Transfer> {
        let mut transfers = Vec::new();
        for from in self.honest.clone() {
            if self.rng.gen_bool(self.rate) {
                if let Some(to) = self.random_honest(from) {
                    let id = self.fresh_id();
                    transfers.push(Transfer::new(id, from, to));
                }
            }
        }
        for from in self.flooders.clone() {
            if let Some(to) = self.random_honest(from) {
                let id = self.fresh_id();
                transfers.push(Transfer::new(id, from, to));
            }
        }
        transfers
    }
}

#[derive(Serialize)]
struct NeighborReport {
    neighbor: NodeAddress,
    forward_count: f64,
    receive_count: f64,
    // rendered as a string: serde_json writes f64::INFINITY as null,
    // which would blank out exactly the flooder rows
    ratio: String,
}

#[derive(Serialize)]
struct SuspectReport {
    suspect: NodeAddress,
    evidence: i64,
}

#[derive(Serialize)]
struct NodeReport {
    address: NodeAddress,
    name: String,
    ledger_records: usize,
    neighbors: Vec<NeighborReport>,
    blacklist: Vec<SuspectReport>,
}

#[derive(Serialize)]
struct RunReport {
    ticks: u64,
    seconds: f64,
    nodes: Vec<NodeReport>,
    flooders: Vec<NodeAddress>,
    detected_by_all_honest: Vec<NodeAddress>,
}

fn build_report(world: &World, honest: &[NodeAddress], flooders: &[NodeAddress]) -> Result<RunReport> {
    let mut nodes = Vec::new();
    for address in world.addresses() {
        let node = world.node(address)?;
        nodes.push(NodeReport {
            address,
            name: node.name().to_string(),
            ledger_records: node.ledger().records().len(),
            neighbors: node
                .observations()
                .iter()
                .map(|(neighbor, obs)| NeighborReport {
                    neighbor,
                    forward_count: obs.forward_count,
                    receive_count: obs.receive_count,
                    ratio: obs.ratio.to_string(),
                })
                .collect(),
            blacklist: node
                .registry()
                .iter()
                .map(|(suspect, evidence)| SuspectReport { suspect, evidence })
                .collect(),
        });
    }

    let mut detected: BTreeSet<NodeAddress> = flooders.iter().copied().collect();
    for address in honest {
        let registry = world.node(*address)?.registry();
        detected.retain(|flooder| registry.contains(*flooder));
    }

    Ok(RunReport {
        ticks: world.tick(),
        seconds: world.now(),
        nodes,
        flooders: flooders.to_vec(),
        detected_by_all_honest: detected.into_iter().collect(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level, &args.log_format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        nodes = args.nodes,
        malicious = args.malicious,
        ticks = args.ticks,
        seed = args.seed,
        "Starting oppnet demo run"
    );

    let config = SimConfigBuilder::new()
        .with_ratio_threshold(args.ratio_threshold)
        .with_sum_threshold(args.sum_threshold)
        .with_range(args.range)
        .build();

    let mut placement = StdRng::seed_from_u64(args.seed);
    let mut world = World::new(config).context("Invalid run configuration")?;

    let mut honest = Vec::new();
    for _ in 0..args.nodes {
        let start = Coord::new(
            placement.gen_range(0.0..args.world_size),
            placement.gen_range(0.0..args.world_size),
        );
        let walk = JitterWalk::new(start, 2.0, args.world_size, placement.gen());
        honest.push(world.add_node("n", Box::new(walk)));
    }

    let mut flooders = Vec::new();
    for _ in 0..args.malicious {
        let start = Coord::new(
            placement.gen_range(0.0..args.world_size),
            placement.gen_range(0.0..args.world_size),
        );
        let walk = JitterWalk::new(start, 2.0, args.world_size, placement.gen());
        flooders.push(world.add_node("adv", Box::new(walk)));
    }

    let traffic = DemoTraffic::new(
        honest.clone(),
        flooders.clone(),
        args.traffic_rate,
        placement.gen(),
    );
    world.set_router(Box::new(traffic));

    world
        .run(args.ticks)
        .context("Simulation step failed")?;

    info!(
        ticks = world.tick(),
        seconds = world.now(),
        "Run complete, building report"
    );

    let report = build_report(&world, &honest, &flooders)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned(x: f64) -> Box<JitterWalk> {
        Box::new(JitterWalk::new(Coord::new(x, 0.0), 0.0, 30.0, 1))
    }

    #[test]
    fn report_renders_infinite_ratio_readably() {
        let mut world = World::new(SimConfigBuilder::new().build()).unwrap();
        let honest = world.add_node("n", pinned(0.0));
        let flooder = world.add_node("adv", pinned(5.0));
        world.step().unwrap();
        world.deliver_message("M1", flooder, honest).unwrap();

        let report = build_report(&world, &[honest], &[flooder]).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        // the flooder has only ever forwarded; its row must say so
        assert!(json.contains(r#""ratio":"inf""#));
        assert!(!json.contains(r#""ratio":null"#));
    }

    #[test]
    fn jitter_walk_stays_inside_the_world() {
        let mut walk = JitterWalk::new(Coord::new(0.0, 0.0), 5.0, 10.0, 7);
        for _ in 0..100 {
            walk.advance(1.0);
            let here = walk.location();
            assert!((0.0..=10.0).contains(&here.x));
            assert!((0.0..=10.0).contains(&here.y));
        }
    }
}
