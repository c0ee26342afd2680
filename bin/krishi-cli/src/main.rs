//! krishi-cli: talk to a running krishi-server from the terminal.
//!
//! ```bash
//! krishi-cli --server http://localhost:5000
//! krishi-cli --lat 10.85 --lon 76.27
//! RUST_LOG=debug krishi-cli
//! ```
//!
//! Each line read from stdin is one chat message. `/quit` or EOF exits.

use anyhow::{Context, Result};
use clap::Parser;
use krishi_client::context::{Coordinates, FieldReport, GeocodeClient, WeatherClient};
use krishi_client::{ChatMessage, ChatSession, GREETING, HttpProxyApi, IgnoreReason, SendOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const QUIT: &str = "/quit";

/// Farming assistant chat in the terminal
#[derive(Parser, Debug)]
#[command(name = "krishi-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of krishi-server
    #[arg(
        short,
        long,
        env = "KRISHI_SERVER_URL",
        default_value = krishi_client::api::DEFAULT_SERVER_URL,
        value_name = "URL"
    )]
    server: String,

    /// Field latitude in decimal degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Field longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    println!("{GREETING}\n");

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let report = FieldReport::fetch(
            &WeatherClient::default(),
            &GeocodeClient::default(),
            Coordinates::new(lat, lon),
        )
        .await;
        print_report(&report);
    }

    let api = HttpProxyApi::new(args.server.trim_end_matches('/'));
    match api.health().await {
        Ok(health) if health.provider_configured => {
            debug!(message = %health.message, "chat service ready")
        }
        Ok(health) => println!("warning: {}\n", health.message),
        Err(e) => warn!(server = api.base_url(), error = %e, "chat health check failed"),
    }

    let session = ChatSession::new(api);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line == QUIT {
            break;
        }
        match session.send_message(line).await {
            SendOutcome::Replied(reply) => print_reply(&reply),
            SendOutcome::Ignored(IgnoreReason::Empty) => {}
            SendOutcome::Ignored(IgnoreReason::Busy) => {
                println!("(still waiting for the previous answer)");
            }
        }
    }

    Ok(())
}

fn print_reply(reply: &ChatMessage) {
    let marker = if reply.is_error { "!" } else { ">" };
    println!("[{}] {marker} {}\n", reply.time_label(), reply.text);
}

fn print_report(report: &FieldReport) {
    println!(
        "Field at {:.4}, {:.4}: {}",
        report.coordinates.lat, report.coordinates.lon, report.area
    );
    println!("Weather: {}", report.outlook.label());
    println!("Field: {}", report.outlook.field_suggestion());
    println!("Crops: {}\n", report.outlook.crop_recommendation());
}
