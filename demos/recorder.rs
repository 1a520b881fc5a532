//! Recorder example - capture a trace from one device and replay it into
//! another.
//!
//! Usage:
//!   cargo run --example recorder --features recorder -- record trace.json
//!   cargo run --example recorder --features recorder -- replay trace.json
//!   cargo run --example recorder --features recorder -- replay-fast trace.json

use evmux::codes::{EV_KEY, EV_SYN, KEY_A, KEY_S};
use evmux::{EventRecorder, NodeRegistry, Recording, Source, SourceBuilder};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn keyboard(name: &str, nodes: Arc<NodeRegistry>) -> evmux::Result<Arc<Source>> {
    let mut builder = SourceBuilder::new(name);
    builder.support_event(EV_SYN)?;
    builder.support_event(EV_KEY)?;
    builder.support_key(KEY_A)?;
    builder.support_key(KEY_S)?;
    builder.register(nodes)
}

fn main() -> evmux::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        println!("Usage:");
        println!("  {} record <filename>      - Record a synthetic trace", args[0]);
        println!("  {} replay <filename>      - Replay with original timing", args[0]);
        println!("  {} replay-fast <filename> - Replay as fast as possible", args[0]);
        return Ok(());
    }

    let command = &args[1];
    let filename = &args[2];
    let nodes = Arc::new(NodeRegistry::new());

    match command.as_str() {
        "record" => {
            let source = keyboard("recorded keyboard", nodes)?;
            let mut recorder = EventRecorder::new();
            recorder.start(&source)?;

            for code in [KEY_A, KEY_S, KEY_A] {
                source.push_event(EV_KEY, code, 1)?;
                source.sync()?;
                thread::sleep(Duration::from_millis(100));
                source.push_event(EV_KEY, code, 0)?;
                source.sync()?;
                thread::sleep(Duration::from_millis(50));
            }

            let recording = recorder.stop()?.with_description("three key taps");
            println!("Total events: {}", recording.event_count());
            println!("Duration: {:?}", recording.duration());
            recording.save(filename)?;
            println!("Saved to: {}", filename);
        }
        "replay" | "replay-fast" => {
            let recording = Recording::load(filename)?;
            let target = keyboard("replay keyboard", nodes)?;
            let client = target.register_client_with_capacity(64)?;

            println!("Replaying {} events...", recording.event_count());
            if command == "replay" {
                recording.replay(&target)?;
            } else {
                recording.replay_fast(&target)?;
            }

            for event in client.read(usize::MAX) {
                println!("  {}", event);
            }
            println!("Replay complete!");
        }
        _ => {
            eprintln!("Unknown command: {}", command);
        }
    }

    Ok(())
}
