//! Script-following example, entirely in process
//!
//! Run with: cargo run --example follow_script
//!
//! A demo agent "speaks" the prepared script into a room; a transcript
//! stream subscribes to the same room and feeds a [`ScriptFollower`], which
//! prints each cursor advance the way a teleprompter display would react.

use std::sync::Arc;
use std::time::Duration;

use teleprompt_rs::agent::{AgentConfig, AgentWorker, ChannelSource};
use teleprompt_rs::align::ScriptFollower;
use teleprompt_rs::protocol::TranscriptEvent;
use teleprompt_rs::registry::RoomRegistry;
use teleprompt_rs::transport::{LocalConnector, StreamConfig, StreamEvent, TranscriptStream};

const SCRIPT: &str = "Good evening and welcome to the show. \
Our first story takes us across the city. \
Reporters have been following it all day. \
We will be right back after the break.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teleprompt_rs=info".parse()?),
        )
        .init();

    let registry = Arc::new(RoomRegistry::new());

    // Viewer side: reconnecting stream plus the follower
    let (mut stream, mut events) = TranscriptStream::new(
        StreamConfig::new("studio", "display"),
        LocalConnector::new(Arc::clone(&registry)),
    );
    stream.connect()?;

    let mut follower = ScriptFollower::new(SCRIPT);
    println!("script has {} sentences", follower.script().len());
    println!("> {}", follower.script().get(0).map(|s| s.text.as_str()).unwrap_or(""));

    // Speaker side: the agent reads the script aloud, imperfectly.
    let (tx, source) = ChannelSource::new(16);
    let (mut worker, _worker_events) = AgentWorker::new(
        AgentConfig::new("studio"),
        Arc::clone(&registry),
        source,
    );
    worker.start().await?;

    let speaker = tokio::spawn(async move {
        let spoken = [
            "good evening and",                       // interim, ignored
            "good evening and welcome to the show",   // matches sentence 0
            "our first story takes us across",        // matches sentence 1
            "reporters have been following it",       // matches sentence 2
            "we will be right back",                  // matches sentence 3, end of script
        ];
        for (i, text) in spoken.iter().enumerate() {
            let event = if i == 0 {
                TranscriptEvent::interim_text(*text, "host")
            } else {
                TranscriptEvent::final_text(*text, "host")
            };
            if tx.send(event).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
    });

    let mut finals_seen = 0;
    while finals_seen < 4 {
        match events.recv().await {
            Some(StreamEvent::Transcript(event)) => {
                if event.is_final {
                    finals_seen += 1;
                }
                match follower.on_transcript(&event) {
                    Some(position) => {
                        let sentence = follower
                            .script()
                            .get(position)
                            .map(|s| s.text.as_str())
                            .unwrap_or("");
                        println!("heard \"{}\"", event.text);
                        println!("> {}", sentence);
                    }
                    None => println!("heard \"{}\" (cursor stays)", event.text),
                }
            }
            Some(_) => {}
            None => break,
        }
    }

    speaker.await?;
    worker.stop().await?;
    stream.disconnect();
    println!("done");
    Ok(())
}
