// crates/greeter-cli/src/main.rs
//
// CLI entrypoint: sends one SayHello request and prints the greeting.

mod rpc_client;

use std::time::Duration;

use clap::Parser;

/// Greeter client.
#[derive(Parser, Debug)]
#[command(name = "greeter", version = "0.1.0", about = "Send a SayHello request to greeter-daemon")]
struct Cli {
    /// RPC endpoint for the greeter-daemon.
    #[arg(long, default_value = "http://localhost:50051")]
    endpoint: String,

    /// Name to greet.
    #[arg(long, default_value = "Zee")]
    name: String,

    /// Per-call timeout in seconds.
    #[arg(long, default_value_t = 3)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let timeout = Duration::from_secs(cli.timeout_secs);
    match rpc_client::say_hello(&cli.endpoint, &cli.name, timeout).await {
        Ok(message) => {
            println!("Greeting: {}", message);
            Ok(())
        }
        Err(e) => {
            eprintln!("Could not greet: {}", e);
            Err(e.into())
        }
    }
}
