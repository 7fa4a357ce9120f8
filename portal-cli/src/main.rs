//! portal-cli: command line front end of the invoicing portal
//!
//! Looks up purchase tickets, shows their CFDI status, downloads documents
//! and submits CFDI requests against the portal API.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use portal_client::{ArtifactKind, ClientConfig, PortalApi};

/// Portal de facturación: tickets y CFDI
#[derive(Parser, Debug)]
#[command(name = "portal-cli", version, about)]
struct Cli {
    /// Portal API base URL
    #[arg(long, global = true, env = "PORTAL_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "PORTAL_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up a ticket and show its CFDI status
    Buscar { folio: String },

    /// Show the CFDI status of a ticket
    Estado { folio: String },

    /// Download the ticket PDF or the stamped CFDI
    Descargar {
        folio: String,
        /// ticket-pdf, cfdi-pdf or cfdi-xml
        #[arg(long, default_value = "ticket-pdf")]
        tipo: ArtifactKind,
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Request the CFDI of a ticket with contact data only
    Solicitar {
        folio: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long)]
        nota: Option<String>,
    },

    /// Submit a full invoicing request. RFC and razón social are looked up
    /// for the folio when omitted.
    Facturar(commands::FacturarArgs),

    /// List the CFDI use and tax regime catalogs
    Catalogos,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_cli=info,portal_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    tracing::debug!(base_url = %config.base_url, timeout = config.timeout, "Portal client configured");

    let api: Arc<dyn PortalApi> = Arc::new(config.build_http_client()?);

    match cli.command {
        Commands::Buscar { folio } => commands::buscar(api, &folio).await,
        Commands::Estado { folio } => commands::estado(api, &folio).await,
        Commands::Descargar { folio, tipo, dir } => {
            commands::descargar(api, &folio, tipo, dir).await
        }
        Commands::Solicitar {
            folio,
            email,
            telefono,
            nota,
        } => commands::solicitar(api, &folio, email, telefono, nota).await,
        Commands::Facturar(args) => commands::facturar(api, &config, args).await,
        Commands::Catalogos => {
            commands::catalogos();
            Ok(())
        }
    }
}
