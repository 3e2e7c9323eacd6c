use daikin_skyfi::{MessageLogMode, SkyFiClient};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> daikin_skyfi::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let usage = "usage: monitor <ip> <password> [--log <path>]";
    let ip = args.get(1).expect(usage);
    let password = args.get(2).expect(usage);
    let log_path = args
        .iter()
        .position(|a| a == "--log")
        .and_then(|i| args.get(i + 1));

    let mut builder = SkyFiClient::builder(ip, password)
        .timeout(Duration::from_secs(10))
        .on_event(|event| match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("unprintable event: {e}"),
        });

    if let Some(path) = log_path {
        builder = builder.message_log(MessageLogMode::Diffed, path);
    }

    let mut client = builder.build()?;

    println!("Connecting to {ip}...");
    client.init().await?;
    for (label, value) in client.summary() {
        println!("{label:>18}: {value}");
    }
    if let Some(zones) = client.zones()? {
        for zone in zones {
            println!(
                "{:>18}: {}",
                zone.name,
                if zone.on { "on" } else { "off" }
            );
        }
    }

    println!("Polling for updates...");
    loop {
        tokio::time::sleep(Duration::from_secs(30)).await;
        if let Err(e) = client.init().await {
            eprintln!("Poll error: {e}");
        }
    }
}
