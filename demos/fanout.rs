//! Fan-out example - one producer, two readers with different queue sizes.
//!
//! Run with: cargo run --example fanout
//!
//! The fast reader drains continuously. The slow reader has a tiny queue and
//! sleeps between reads, so it sees SYN_DROPPED whenever it falls behind.

use evmux::codes::{EV_KEY, EV_REL, EV_SYN, KEY_A, REL_X, REL_Y};
use evmux::{ClientReader, NodeRegistry, SourceBuilder};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> evmux::Result<()> {
    println!("evmux fanout example");
    println!("====================\n");

    let nodes = Arc::new(NodeRegistry::new());
    let mut builder = SourceBuilder::new("demo mouse");
    builder.set_phys("demo/input0");
    builder.support_event(EV_SYN)?;
    builder.support_event(EV_REL)?;
    builder.support_event(EV_KEY)?;
    builder.support_rel(REL_X)?;
    builder.support_rel(REL_Y)?;
    builder.support_key(KEY_A)?;
    let source = builder.register(nodes.clone())?;

    for (node, name) in nodes.nodes() {
        println!("/dev/{} -> {}", node.path, name);
    }

    let fast = ClientReader::open(&source)?;
    let slow = ClientReader::with_capacity(&source, 4)?;

    let producer = {
        let source = source.clone();
        thread::spawn(move || -> evmux::Result<()> {
            for i in 0..20 {
                source.push_event(EV_REL, REL_X, i)?;
                source.push_event(EV_REL, REL_Y, -i)?;
                source.sync()?;
                thread::sleep(Duration::from_millis(5));
            }
            source.push_event(EV_KEY, KEY_A, 1)?;
            source.sync()
        })
    };

    let fast_thread = thread::spawn(move || {
        let mut count = 0;
        while let Some(event) = fast.recv_timeout(Duration::from_millis(200)) {
            count += 1;
            if event.event_type == EV_KEY {
                println!("[fast] {}", event);
            }
        }
        count
    });

    let mut slow_count = 0;
    let mut dropped = 0;
    while let Some(event) = slow.recv_timeout(Duration::from_millis(200)) {
        slow_count += 1;
        if event.is_dropped() {
            dropped += 1;
            println!("[slow] SYN_DROPPED, resynchronizing");
            slow.client().filter_queue(evmux::codes::EV_CNT);
        }
        thread::sleep(Duration::from_millis(15));
    }

    match producer.join() {
        Ok(result) => result?,
        Err(_) => eprintln!("producer panicked"),
    }
    let fast_count = fast_thread.join().unwrap_or(0);

    println!("\nfast reader: {} events", fast_count);
    println!("slow reader: {} events, {} drop markers", slow_count, dropped);
    println!("slow reader queue stats: {:?}", slow.client().stats());
    println!("key A held: {}", source.key_state(KEY_A));

    drop(slow);
    source.unregister()
}
