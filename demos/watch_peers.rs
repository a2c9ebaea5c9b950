//! Watches a simulated peer list the way a node's status window would.
//!
//! A background "network" thread connects, disconnects and re-pings peers
//! while an [`AutoRefresh`] timer keeps the table current. The main thread
//! prints the table a few times, sorted by ping.
//!
//! Run with: `RUST_LOG=peertable=debug cargo run --example watch_peers`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use peertable::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .with_target(false)
        .init();

    let registry = Arc::new(LockedRegistry::with_peers(vec![
        PeerRecord::new(1, "203.0.113.7:8333", "/Satoshi:0.9.1/").with_ping(0.180),
        PeerRecord::new(2, "198.51.100.23:8333", "/Satoshi:0.8.6/").with_ping(0.045),
        PeerRecord::new(3, "192.0.2.91:8333", "/bitcoinj:0.11/"),
    ]));

    let running = Arc::new(AtomicBool::new(true));
    let network = {
        let registry = Arc::clone(&registry);
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("network".into())
            .spawn(move || simulate_network(&registry, &running))?
    };

    let (table, mut timer) = PeerTableBuilder::new()
        .refresh_interval(Duration::from_millis(250))
        .sort_by(Some(PeerColumn::Ping), SortOrder::Ascending)
        .spawn(Arc::clone(&registry))?;

    for round in 1..=4 {
        thread::sleep(Duration::from_millis(600));
        info!(round, rows = table.row_count(), "table");
        table.with_read(|model| {
            let headers: Vec<&str> = (0..model.column_count())
                .filter_map(|section| model.header(section))
                .collect();
            println!("{:<22} {:<20} {}", headers[0], headers[1], headers[2]);
            for row in 0..model.row_count() {
                let cells: Vec<String> = PeerColumn::ALL
                    .iter()
                    .filter_map(|&column| model.data(row, column))
                    .collect();
                println!("{:<22} {:<20} {}", cells[0], cells[1], cells[2]);
            }
        });
        println!();
    }

    if let Some(row) = table.row_by_node_id(2) {
        info!(row, "peer 2 selected");
    }

    timer.stop();
    running.store(false, Ordering::Release);
    let _ = network.join();
    Ok(())
}

fn simulate_network(registry: &LockedRegistry<PeerRecord>, running: &AtomicBool) {
    let mut tick: u32 = 0;
    while running.load(Ordering::Acquire) {
        tick = tick.wrapping_add(1);
        for id in 1..=4 {
            registry.update(id, |peer| {
                let jitter = f64::from((tick * 37 + id as u32 * 11) % 50) / 1000.0;
                peer.ping_time = Some(0.020 + jitter * id as f64);
            });
        }
        match tick % 8 {
            3 => registry.connect(PeerRecord::new(4, "[2001:db8::17]:8333", "/Satoshi:0.9.0/")),
            7 => {
                let _ = registry.disconnect(4);
            }
            _ => {}
        }
        thread::sleep(Duration::from_millis(90));
    }
}
