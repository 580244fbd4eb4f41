//! Simple transcript server example
//!
//! Run with: cargo run --example simple_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example simple_server                    # binds to 0.0.0.0:8080
//!   cargo run --example simple_server 127.0.0.1:9090     # binds to 127.0.0.1:9090
//!
//! A demo agent publishes one scripted transcript per second into the
//! "studio" room. Subscribe to it:
//!
//!   curl -N "http://localhost:8080/api/transcripts/sse?room=studio&participant=me"
//!
//! Check occupancy:
//!
//!   curl http://localhost:8080/api/transcripts/status

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use teleprompt_rs::agent::{AgentConfig, AgentWorker, ChannelSource};
use teleprompt_rs::protocol::TranscriptEvent;
use teleprompt_rs::registry::RoomRegistry;
use teleprompt_rs::server::{self, ServerConfig};

const LINES: &[&str] = &[
    "Welcome to the evening broadcast.",
    "Tonight we are looking at the week in review.",
    "First, the headlines.",
    "And now over to the weather desk.",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr: SocketAddr = match std::env::args().nth(1) {
        Some(addr) => addr.parse()?,
        None => "0.0.0.0:8080".parse().unwrap(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teleprompt_rs=debug".parse()?),
        )
        .init();

    let registry = Arc::new(RoomRegistry::new());

    // Demo speech source: replays the scripted lines forever.
    let (tx, source) = ChannelSource::new(16);
    tokio::spawn(async move {
        loop {
            for (i, line) in LINES.iter().enumerate() {
                // An interim result first, then the final one
                let interim: String = line.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
                if tx
                    .send(TranscriptEvent::interim_text(interim, "host"))
                    .await
                    .is_err()
                {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(400)).await;

                if tx
                    .send(TranscriptEvent::final_text(*line, "host"))
                    .await
                    .is_err()
                {
                    return;
                }
                println!("published line {} of {}", i + 1, LINES.len());
                tokio::time::sleep(Duration::from_millis(600)).await;
            }
        }
    });

    let (mut worker, _events) = AgentWorker::new(
        AgentConfig::new("studio"),
        Arc::clone(&registry),
        source,
    );
    worker.start().await?;

    let config = ServerConfig::default().bind(bind_addr);
    println!("Transcript server on http://{}", bind_addr);
    println!();
    println!("=== Subscribe ===");
    println!("curl -N \"http://localhost:{}/api/transcripts/sse?room=studio&participant=me\"", bind_addr.port());
    println!();

    server::serve_until(config, registry, async {
        let _ = tokio::signal::ctrl_c().await;
        println!("\nShutting down...");
    })
    .await?;

    worker.stop().await?;
    Ok(())
}
