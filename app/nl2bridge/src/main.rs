use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use bridge::{shutdown_channel, BridgeConfig, CadenceMode, ConnectionSupervisor};
use clap::Parser;
use driver::{Nl2Connector, WsCommandSink};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(name = "nl2bridge")]
#[command(about = "Streams NoLimits 2 ride orientation to a motion platform", long_about = None)]
struct Args {
    /// Telemetry samples per second
    #[arg(long = "refreshrate", default_value_t = 30.0)]
    refresh_rate: f64,

    /// Seconds between reconnect attempts
    #[arg(long = "retryinterval", default_value_t = 5.0)]
    retry_interval: f64,

    /// Motion platform WebSocket host
    #[arg(long = "wsaddress", default_value = "192.168.1.99")]
    ws_address: String,

    #[arg(long = "wsport", default_value_t = 8765)]
    ws_port: u16,

    /// NoLimits 2 telemetry server host
    #[arg(long = "nl2address", default_value = "127.0.0.1")]
    nl2_address: String,

    #[arg(long = "nl2port", default_value_t = driver::nl2::DEFAULT_PORT)]
    nl2_port: u16,

    /// Keep ticks on a fixed grid instead of correcting each tick alone
    #[arg(long = "drift-compensation", default_value_t = false)]
    drift_compensation: bool,
}

impl Args {
    fn bridge_config(&self) -> anyhow::Result<BridgeConfig> {
        let mode = if self.drift_compensation {
            CadenceMode::DriftCompensated
        } else {
            CadenceMode::PerTick
        };
        BridgeConfig::new(self.refresh_rate, self.retry_interval, mode)
            .context("Invalid command line settings")
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<8} {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let config = args.bridge_config()?;
    info!(
        "Starting bridge at {} Hz, retrying every {:?}",
        config.refresh_rate_hz, config.retry_interval
    );

    let sink = Arc::new(WsCommandSink::spawn(
        format!("ws://{}:{}", args.ws_address, args.ws_port),
        config.retry_interval,
    ));
    let connector = Nl2Connector::new(args.nl2_address.clone(), args.nl2_port);

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                trigger.trigger();
            }
            Err(e) => {
                error!("Unable to listen for interrupt: {}", e);
                // dropping the trigger would stop the bridge
                std::future::pending::<()>().await;
                drop(trigger);
            }
        }
    });

    let supervisor = ConnectionSupervisor::new(connector, sink, &config)
        .context("Failed to set up the connection supervisor")?;
    let stats = supervisor.run(shutdown).await;
    info!(
        "Exiting: {} connection attempt(s), {} session(s), {} failure(s)",
        stats.connect_attempts, stats.sessions, stats.failures
    );

    Ok(())
}
