//! Grab example - one client takes exclusive access to a keyboard.
//!
//! Run with: cargo run --example grab
//!
//! While the grab is held, the second client receives nothing. Releasing the
//! grab restores delivery to everyone.

use evmux::codes::{EV_KEY, EV_LED, KEY_Q, KEY_W, LED_CAPSL};
use evmux::{AttachInfo, DeviceMethods, Error, NodeRegistry, ParentBus, Source, SourceBuilder};
use std::sync::Arc;

struct LedDriver;

impl DeviceMethods for LedDriver {
    fn open(&self, source: &Source) -> evmux::Result<()> {
        println!("driver: '{}' opened", source.name());
        Ok(())
    }

    fn close(&self, source: &Source) {
        println!("driver: '{}' closed", source.name());
    }

    fn event(&self, _source: &Source, event_type: u16, code: u16, value: i32) {
        if event_type == EV_LED && code == LED_CAPSL {
            println!("driver: caps lock LED {}", if value != 0 { "on" } else { "off" });
        }
    }
}

fn type_key(source: &Source, code: u16) -> evmux::Result<()> {
    source.push_event(EV_KEY, code, 1)?;
    source.sync()?;
    source.push_event(EV_KEY, code, 0)?;
    source.sync()
}

fn main() -> evmux::Result<()> {
    println!("evmux grab example");
    println!("==================\n");

    let mut builder = SourceBuilder::new("demo keyboard");
    builder.set_parent(AttachInfo::new(
        "ukbd0",
        Some(ParentBus::UsbHub {
            vendor: 0x046d,
            product: 0xc31c,
        }),
    ));
    builder.set_methods(Arc::new(LedDriver));
    builder.support_event(EV_KEY)?;
    builder.support_event(EV_LED)?;
    builder.support_key(KEY_Q)?;
    builder.support_key(KEY_W)?;
    builder.support_led(LED_CAPSL)?;
    let source = builder.register(Arc::new(NodeRegistry::new()))?;
    println!("{:?}\n", source.id());

    let console = source.register_client()?;
    let hotkeys = source.register_client()?;

    hotkeys.grab()?;
    if let Err(Error::Busy) = console.grab() {
        println!("console: grab refused, device is busy");
    }

    type_key(&source, KEY_Q)?;
    println!("while grabbed: hotkeys={} console={}", hotkeys.len(), console.len());

    hotkeys.release()?;
    type_key(&source, KEY_W)?;
    println!("after release: hotkeys={} console={}", hotkeys.len(), console.len());

    source.inject_event(EV_LED, LED_CAPSL, 1)?;

    print!("{}", console.dump_queue());

    hotkeys.dispose()?;
    console.dispose()?;
    source.unregister()
}
