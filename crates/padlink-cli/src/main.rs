//! padlink CLI: run a receiver, replay touch traces, generate certificates.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use padlink_client::replay::{load_trace, replay_offline, replay_paced};
use padlink_client::{ClientConfig, ClientSession, QuicSink};
use padlink_input::InputBackend;
use padlink_protocol::QuicTransport;
use padlink_receiver::setup::{config_dir, load_config, load_or_generate_certs};
use padlink_receiver::{CommandRouter, Platform, Receiver, ReceiverEvent, SystemRunner};
use padlink_types::ScreenSize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "padlink",
    about = "Use a phone as a trackpad and remote for this machine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the receiver on this machine.
    Serve {
        /// Path to configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Classify a recorded touch trace. Prints one intent per line, or
    /// sends them to a receiver with `--connect`.
    Replay {
        /// JSON trace file.
        trace: PathBuf,

        /// Receiver address (host:port) to send the intents to.
        #[arg(long)]
        connect: Option<SocketAddr>,

        /// Certificate fingerprint the receiver must present.
        #[arg(long)]
        fingerprint: Option<String>,

        /// Path to client configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a TLS certificate for this machine.
    GenerateCert {
        /// Output directory for certificate files.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Replay {
            trace,
            connect,
            fingerprint,
            config,
        } => {
            init_tracing("warn");
            let mut client_config = ClientConfig::load(config.as_deref())?;
            if let Some(fingerprint) = fingerprint {
                client_config.server.fingerprint = Some(fingerprint);
            }
            match connect {
                Some(addr) => {
                    client_config.server.address = addr.to_string();
                    replay_live(&trace, &client_config).await
                }
                None => replay_print(&trace, &client_config),
            }
        }
        Commands::GenerateCert { output } => {
            init_tracing("info");
            generate_cert(&output)
        }
    }
}

async fn serve(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    init_tracing(&config.server.log_level);

    let cert_dir = config_dir();
    std::fs::create_dir_all(&cert_dir)
        .with_context(|| format!("failed to create {}", cert_dir.display()))?;
    let (cert_pem, key_pem) = load_or_generate_certs(&cert_dir)?;

    let addr = config.server.socket_addr()?;
    let transport = QuicTransport::bind(addr, &cert_pem, &key_pem)?;

    let screen = config.pointer.screen();
    let backend = input_backend(&config.identity.name, screen)?;
    let router = CommandRouter::new(
        backend,
        Arc::new(SystemRunner),
        Platform::current(),
        screen,
        &config.pointer,
    );

    let mut receiver = Receiver::new(config, transport, router);
    let events = receiver.event_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            let _ = events.send(ReceiverEvent::Shutdown).await;
        }
    });

    receiver.run().await?;
    Ok(())
}

#[cfg(all(target_os = "linux", feature = "linux"))]
fn input_backend(name: &str, screen: ScreenSize) -> anyhow::Result<Box<dyn InputBackend>> {
    let backend = padlink_input::linux::UinputBackend::new(name, screen)
        .context("failed to create uinput device (is /dev/uinput writable?)")?;
    Ok(Box::new(backend))
}

#[cfg(all(not(all(target_os = "linux", feature = "linux")), feature = "mock"))]
fn input_backend(_name: &str, screen: ScreenSize) -> anyhow::Result<Box<dyn InputBackend>> {
    tracing::warn!("no native input backend, using the recording mock");
    Ok(Box::new(padlink_input::mock::MockInput::new(screen)))
}

#[cfg(not(any(all(target_os = "linux", feature = "linux"), feature = "mock")))]
fn input_backend(_name: &str, _screen: ScreenSize) -> anyhow::Result<Box<dyn InputBackend>> {
    anyhow::bail!("no input backend compiled in; build with the `linux` or `mock` feature")
}

fn replay_print(trace: &Path, config: &ClientConfig) -> anyhow::Result<()> {
    let records = load_trace(trace)?;
    for timed in replay_offline(&records, &config.gesture, &config.throttle) {
        println!("{}", serde_json::to_string(&timed)?);
    }
    Ok(())
}

async fn replay_live(trace: &Path, config: &ClientConfig) -> anyhow::Result<()> {
    let records = load_trace(trace)?;
    let sink = QuicSink::connect(config).await?;
    println!("Connected to {}", sink.welcome().name);

    let (session, handle) = ClientSession::new(&config.gesture, &config.throttle, sink);
    let session = tokio::spawn(session.run());
    let fed = replay_paced(&records, &handle).await;
    handle.shutdown().await;
    session.await??;
    fed?;
    Ok(())
}

fn generate_cert(output: &Path) -> anyhow::Result<()> {
    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "padlink".to_string());
    let addresses: Vec<_> = padlink_receiver::health::lan_address().into_iter().collect();

    tracing::info!(hostname = %hostname, output = %output.display(), "generating TLS certificate");

    let cert = padlink_certgen::generate_certificate(&hostname, &addresses)?;
    let (cert_path, key_path) = cert.write_to(output)?;

    println!("Certificate: {}", cert_path.display());
    println!("Private key: {}", key_path.display());
    println!("Fingerprint: {}", cert.fingerprint);
    Ok(())
}
