use std::sync::{Arc, Mutex};

use daikin_skyfi::{Event, SkyFiClient};

/// Run with: cargo test --test integration -- --ignored
/// Requires a bridge on the LAN:
///   SKYFI_HOST=192.168.1.50 SKYFI_PASSWORD=... cargo test --test integration -- --ignored
#[tokio::test]
#[ignore]
async fn init_reads_live_bridge() {
    let host = std::env::var("SKYFI_HOST").expect("SKYFI_HOST not set");
    let password = std::env::var("SKYFI_PASSWORD").expect("SKYFI_PASSWORD not set");

    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(vec![]));
    let events_clone = events.clone();

    let mut client = SkyFiClient::builder(host, password)
        .on_event(move |event| {
            events_clone.lock().unwrap().push(event.clone());
        })
        .build()
        .expect("client should build");

    client.init().await.expect("init failed");

    assert!(client.get("acmode").is_ok(), "bridge should report a mode");
    assert!(client.inside_temperature().is_some());
    assert!(!events.lock().unwrap().is_empty(), "should have received events");

    for (label, value) in client.summary() {
        println!("{label:>18}: {value}");
    }
    if let Some(zones) = client.zones().expect("zones should decode") {
        for zone in zones {
            println!("zone {} {:?}: {}", zone.id, zone.name, if zone.on { "on" } else { "off" });
        }
    }
}
