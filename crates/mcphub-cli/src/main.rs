//! mcphub - MCP server registry and client config sync
//!
//! Usage:
//!   mcphub servers                    # List registered servers
//!   mcphub enable claude_code fs      # Enable a server for a client
//!   mcphub sync                       # Rewrite every client config
//!   mcphub -c ./config.toml validate  # Validate a specific registry

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcphub_core::config::RegistryStore;
use mcphub_core::error::HubError;
use mcphub_core::registry::{ClientDefinition, ServerDefinition};
use mcphub_core::sync::{ClientServerStatus, SyncOrchestrator};
use mcphub_core::validation::detect_transport;

#[derive(Parser)]
#[command(name = "mcphub")]
#[command(about = "Central MCP server registry synced into client configs", long_about = None)]
struct Cli {
    /// Registry file (defaults to the per-user config, then ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered servers in registry order
    Servers {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List clients and the servers each has enabled
    Clients {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print one server's config
    ShowServer { name: String },

    /// Add a server to the registry
    Add {
        name: String,
        /// Server config as a JSON object, e.g. '{"command": "npx", "args": ["-y", "pkg"]}'
        #[arg(long)]
        json: String,
    },

    /// Remove a server from the registry and from client configs
    #[command(alias = "rm")]
    Remove { name: String },

    /// Enable a server for a client
    Enable { client: String, server: String },

    /// Disable a server for a client
    Disable { client: String, server: String },

    /// Show which registry servers are present in a client's config
    Status {
        client: String,
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Rewrite every client config from the registry
    Sync,

    /// Validate the whole registry
    Validate,

    /// Print the registry document, or a client's config
    ShowConfig {
        #[arg(long)]
        client: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mcphub=debug,info"
    } else {
        "mcphub=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = RegistryStore::resolve(cli.config.as_deref())?;
    run_cli(cli.command, store)
}

fn run_cli(command: Commands, store: RegistryStore) -> Result<()> {
    if let Commands::ShowConfig { client: None } = &command {
        print!("{}", store.read_raw()?);
        return Ok(());
    }

    let config_path = store.path().to_path_buf();
    let mut hub = SyncOrchestrator::open(store)?;
    tracing::debug!(
        "Loaded {} server(s) from {}",
        hub.list_servers().len(),
        config_path.display()
    );

    match command {
        Commands::Servers { format } => match format {
            OutputFormat::Table => print_servers_table(hub.list_servers()),
            OutputFormat::Json => print_json(&servers_json(hub.list_servers()))?,
        },
        Commands::Clients { format } => {
            let clients: Vec<_> = hub.list_clients().iter().collect();
            match format {
                OutputFormat::Table => print_clients_table(&clients),
                OutputFormat::Json => print_json(&hub.list_clients())?,
            }
        }
        Commands::ShowServer { name } => {
            let server = hub.get_server(&name)?;
            print_json(&server.config)?;
        }
        Commands::Add { name, json } => {
            let config: Map<String, Value> = serde_json::from_str(&json)
                .context("Server config must be a JSON object")?;
            let server = hub.add_server(&name, config)?;
            println!("Added server '{}'", server.name);
        }
        Commands::Remove { name } => {
            let removed = hub.remove_server(&name).map_err(report_sync_failures)?;
            println!("Removed server '{}'", removed.name);
        }
        Commands::Enable { client, server } => {
            hub.toggle_client_server(&client, &server, true)?;
            println!("Enabled '{}' for {}", server, client);
        }
        Commands::Disable { client, server } => {
            hub.toggle_client_server(&client, &server, false)?;
            println!("Disabled '{}' for {}", server, client);
        }
        Commands::Status { client, format } => {
            let status = hub.client_status(&client)?;
            match format {
                OutputFormat::Table => print_status_table(&client, &status),
                OutputFormat::Json => print_json(&status)?,
            }
        }
        Commands::Sync => {
            hub.sync_all_clients().map_err(report_sync_failures)?;
            println!("Synced {} client(s)", hub.list_clients().len());
        }
        Commands::Validate => {
            hub.validate()?;
            println!("Registry is valid");
        }
        Commands::ShowConfig { client } => {
            if let Some(client) = client {
                let blob = hub.read_client_config(&client)?;
                print_json(&blob)?;
            }
        }
    }
    Ok(())
}

fn report_sync_failures(error: HubError) -> anyhow::Error {
    if let HubError::SyncFailed { failures } = &error {
        for failure in failures {
            eprintln!("  {}: {}", failure.client, failure.error);
        }
        return anyhow::anyhow!("{} client(s) could not be updated", failures.len());
    }
    error.into()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn transport_summary(server: &ServerDefinition) -> (&'static str, String) {
    match detect_transport(&server.config) {
        Ok(transport) => (transport.kind.field(), transport.value),
        Err(_) => ("invalid", "-".to_string()),
    }
}

fn servers_json(servers: &[ServerDefinition]) -> Value {
    let mut output = Map::new();
    for server in servers {
        output.insert(server.name.clone(), Value::Object(server.config.clone()));
    }
    Value::Object(output)
}

fn print_servers_table(servers: &[ServerDefinition]) {
    if servers.is_empty() {
        println!("No servers registered.");
        println!("Add one with: mcphub add <name> --json '{{\"command\": \"...\"}}'");
        return;
    }

    println!("{:<24} {:<10} Target", "Name", "Transport");
    println!("{}", "-".repeat(70));

    for server in servers {
        let (kind, target) = transport_summary(server);
        println!("{:<24} {:<10} {}", truncate(&server.name, 24), kind, target);
    }
}

fn print_clients_table(clients: &[(&String, &ClientDefinition)]) {
    if clients.is_empty() {
        println!("No clients configured.");
        return;
    }

    println!("{:<16} {:<32} Enabled", "Client", "Config");
    println!("{}", "-".repeat(70));

    for (id, client) in clients {
        let enabled = if client.enabled.is_empty() {
            "-".to_string()
        } else {
            client.enabled.join(", ")
        };
        println!(
            "{:<16} {:<32} {}",
            truncate(id, 16),
            truncate(&client.config_path, 32),
            enabled
        );
    }
}

fn print_status_table(client: &str, status: &[ClientServerStatus]) {
    println!("Client: {}", client);
    println!("  {:<24} {:<9} {:<9}", "Server", "Enabled", "Present");
    println!("  {}", "-".repeat(50));

    for entry in status {
        let marker = if entry.is_drifted() { "  (out of sync)" } else { "" };
        println!(
            "  {:<24} {:<9} {:<9}{}",
            truncate(&entry.server, 24),
            yes_no(entry.enabled),
            yes_no(entry.present),
            marker
        );
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
