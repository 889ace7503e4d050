//! Courier CLI - encrypted mail relay
//!
//! Usage:
//!   courier serve    - Accept encrypted submissions over HTTP and relay them via SMTP
//!   courier keygen   - Generate the relay's RSA keypair
//!   courier seal     - Encrypt a message the way browser clients do

mod server;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use courier_core::config::ENV_TOKEN;
use courier_core::{Dispatcher, RelayConfig, SmtpRelay, SubmissionGuard};
use courier_crypto::keys::DEFAULT_KEY_BITS;
use courier_crypto::{
    generate_keypair, seal, seal_legacy, KeychainProvider, RecipientKey, SenderKey,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const KEYCHAIN_SERVICE: &str = "courier";

#[derive(Parser)]
#[command(name = "courier")]
#[command(version)]
#[command(about = "Encrypted mail relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay
    Serve {
        /// Read the private key from the system keychain instead of COURIER_TOKEN
        #[arg(long)]
        keychain: bool,
    },

    /// Generate an RSA keypair (base64 SPKI / PKCS#8, no PEM delimiters)
    Keygen {
        /// Modulus size in bits
        #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,

        /// Store the private key in the system keychain instead of printing it
        #[arg(long)]
        keychain: bool,
    },

    /// Encrypt a message for the relay and print the wire string
    Seal {
        /// Relay public key (base64 SPKI)
        #[arg(long)]
        public_key: String,

        /// Recipient address (repeatable)
        #[arg(long = "to", required = true)]
        to: Vec<String>,

        #[arg(long)]
        subject: String,

        /// HTML body
        #[arg(long)]
        html: String,

        /// Bare RSA-OAEP instead of the hybrid envelope (small messages only)
        #[arg(long)]
        legacy: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so keygen/seal output stays pipeable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("courier=info,courier_core=info,courier_crypto=info")
        }))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { keychain } => serve(keychain).await,
        Commands::Keygen { bits, keychain } => keygen(bits, keychain),
        Commands::Seal {
            public_key,
            to,
            subject,
            html,
            legacy,
        } => seal_message(&public_key, to, &subject, &html, legacy),
    }
}

async fn serve(use_keychain: bool) -> anyhow::Result<()> {
    let mut config = RelayConfig::from_env()?;
    if use_keychain {
        let material = KeychainProvider::new(KEYCHAIN_SERVICE)
            .retrieve_private_key()
            .context("reading private key from the system keychain")?;
        config.token = Some(material);
    }

    let missing = config.missing();
    if !missing.is_empty() {
        warn!(?missing, "relay is not fully configured; submissions will be rejected");
    }

    let mut dispatcher = Dispatcher::new(Arc::new(SubmissionGuard::new()));

    if let Some(token) = &config.token {
        let key = RecipientKey::from_material(token)
            .with_context(|| format!("{ENV_TOKEN} is not a usable PKCS#8 RSA private key"))?;
        info!(bits = key.modulus_bits(), "recipient key loaded");
        dispatcher = dispatcher.with_key(key);
    }

    if let (Some(sender), Some(password)) = (&config.sender, &config.sender_password) {
        let relay = SmtpRelay::new(config.smtp_host(), config.smtp_port, sender, password)?;
        info!(
            provider = %config.provider,
            host = config.smtp_host(),
            port = config.smtp_port,
            "SMTP transport ready"
        );
        dispatcher = dispatcher.with_transport(sender.clone(), Arc::new(relay));
    }

    let app = server::build_router(Arc::new(dispatcher));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn keygen(bits: usize, use_keychain: bool) -> anyhow::Result<()> {
    info!(bits, "generating RSA keypair");
    let pair = generate_keypair(bits)?;

    println!("PUBLIC_KEY={}", pair.public_spki);
    if use_keychain {
        KeychainProvider::new(KEYCHAIN_SERVICE).store_private_key(&pair.private_material())?;
        info!(service = KEYCHAIN_SERVICE, "private key stored in the system keychain");
    } else {
        println!("{}={}", ENV_TOKEN, pair.private_pkcs8.as_str());
    }
    Ok(())
}

fn seal_message(
    public_key: &str,
    to: Vec<String>,
    subject: &str,
    html: &str,
    legacy: bool,
) -> anyhow::Result<()> {
    let key = SenderKey::from_spki_base64(public_key).context("parsing --public-key")?;
    let payload = serde_json::json!({
        "toEmail": to,
        "subject": subject,
        "mailText": html,
    })
    .to_string();

    let wire = if legacy {
        seal_legacy(&key, payload.as_bytes())?
    } else {
        seal(&key, payload.as_bytes())?.to_wire()
    };

    println!("{wire}");
    Ok(())
}
