use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Operator CLI for the carbon chain bridge", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit (or resubmit) an emission to the chain service
    Submit { emission_id: i64 },
    /// Show the ledger record of an emission
    Status { emission_id: i64 },
    /// Send a status callback as the chain service would
    Callback {
        /// Webhook shared secret
        #[arg(short, long)]
        secret: String,
        /// One of submitted, confirmed, failed
        #[arg(long)]
        status: String,
        #[arg(long)]
        emission_id: Option<i64>,
        #[arg(long)]
        tx_hash: Option<String>,
        #[arg(long)]
        error_msg: Option<String>,
    },
    /// Check that the bridge is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Submit { emission_id } => {
            client
                .post(format!("{}/onchain/emissions/{}", base, emission_id))
                .send()
                .await?
        }
        Commands::Status { emission_id } => {
            client
                .get(format!("{}/onchain/emissions/{}", base, emission_id))
                .send()
                .await?
        }
        Commands::Callback {
            secret,
            status,
            emission_id,
            tx_hash,
            error_msg,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert("X-Chain-Secret", HeaderValue::from_str(&secret)?);
            client
                .put(format!("{}/onchain/callback", base))
                .headers(headers)
                .json(&json!({
                    "emission_id": emission_id,
                    "tx_hash": tx_hash,
                    "status": status,
                    "error_msg": error_msg,
                }))
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: bridge returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
