//! Connection check against a Dataverse environment.
//!
//! Loads settings from the environment (and `.env` if present), connects,
//! then lists a few machines.
//!
//! ```sh
//! export DATAVERSE_URL='https://org.crm.dynamics.com'
//! export DATAVERSE_CLIENT_ID=... DATAVERSE_CLIENT_SECRET=... DATAVERSE_TENANT_ID=...
//! cargo run --bin dataverse-probe -- 10
//! ```

use conductor_dataverse::{query_mapped, DataverseClient, QueryOptions, Record, MACHINE_MAPPING};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: u32 = 10;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the variables may come from the shell
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let count = match std::env::args().nth(1) {
        None => DEFAULT_COUNT,
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            eprintln!("Error: machine count must be a positive integer, got '{arg}'");
            eprintln!();
            eprintln!("Usage: dataverse-probe [COUNT]");
            std::process::exit(2);
        }),
    };

    let client = DataverseClient::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!();
        eprintln!("  Set DATAVERSE_URL and either:");
        eprintln!("    DATAVERSE_CLIENT_ID, DATAVERSE_CLIENT_SECRET, DATAVERSE_TENANT_ID");
        eprintln!("  or:");
        eprintln!("    DATAVERSE_AUTH_TYPE=key and DATAVERSE_API_KEY");
        std::process::exit(1);
    });

    println!("Connecting to {} ...", client.config().base_url());
    if let Err(e) = client.connect().await {
        eprintln!("Error connecting to Dataverse: {e}");
        std::process::exit(1);
    }
    println!("Successfully connected to Dataverse!\n");

    let options = QueryOptions::new().with_top(count);
    let machines = match query_mapped(&client, &MACHINE_MAPPING, &options).await {
        Ok(machines) => machines,
        Err(e) => {
            eprintln!("Error fetching machines: {e}");
            std::process::exit(1);
        }
    };

    println!("Successfully fetched {} machines.", machines.len());
    if machines.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<30} {:<10} {:<16} Description",
        "Name", "Status", "IP Address"
    );
    for machine in &machines {
        println!(
            "{:<30} {:<10} {:<16} {}",
            text(machine, "name"),
            text(machine, "status"),
            text(machine, "ipAddress"),
            text(machine, "description"),
        );
    }
}

fn text<'a>(record: &'a Record, field: &str) -> &'a str {
    record.get(field).and_then(|v| v.as_str()).unwrap_or("")
}
