//! abpower Router CLI
//!
//! Starts the HTTP server for power, sample-size and MDE computations.

use abpower_router::{config::RouterConfig, init_tracing, start_server, RouterError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RouterError> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = if args.len() > 2 && args[1] == "--config" {
        RouterConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        RouterConfig::default()
    };

    // Container platforms hand the port in through the environment
    config.apply_port_override(env::var("PORT").ok())?;

    init_tracing();
    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("abpower Router - A/B test power and sample-size API");
    println!();
    println!("USAGE:");
    println!("    abpower-router [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    PORT               Overrides bind_port");
    println!("    RUST_LOG           Log filter (default: info)");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address: IP address to bind (default: '0.0.0.0')");
    println!("    - bind_port: Port number (default: 8000)");
    println!("    - curve_points: x-axis samples per power curve (default: 201)");
    println!("    - [solver]: min_sample_size, max_sample_size, iterations,");
    println!("      search_curve_points, ceiling_threshold");
    println!();
}
