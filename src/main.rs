//! api-forwarder
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 API FORWARDER                │
//!   Browser                │                                              │
//!   ANY /proxy/<rest>?q    │  ┌──────────┐   ┌───────────┐   ┌─────────┐  │
//!   ───────────────────────┼─▶│  server  │──▶│  request  │──▶│forwarder│──┼──▶ Upstream API
//!                          │  │ (axum)   │   │target/body│   │+ bearer │  │    <base>/<rest>?q
//!                          │  └──────────┘   └───────────┘   └────┬────┘  │
//!   ◀──────────────────────┼───────── response (JSON | raw) ◀─────┘       │
//!                          │                                              │
//!                          │  config · logging · metrics · lifecycle      │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_forwarder::config::SystemEnv;
use api_forwarder::lifecycle::startup;

#[derive(Parser)]
#[command(name = "api-forwarder")]
#[command(about = "Forward browser requests to an upstream REST API with a server-held bearer token", long_about = None)]
struct Cli {
    /// Optional TOML config file; API_TOKEN and BASE_URL override it.
    #[arg(short, long, env = "FORWARDER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging may not be up yet when configuration fails.
    if let Err(e) = startup::launch(cli.config.as_deref(), &SystemEnv).await {
        eprintln!("api-forwarder: {}", e);
        std::process::exit(1);
    }
}
