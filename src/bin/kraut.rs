//! kraut binary.
//!
//! Assembles the local API for the current directory and prints which
//! builder serves each capability as JSON.
//!
//! # Environment Variables
//!
//! - `KRAUT_PROJECT_DIR`: project root, skipping upward discovery
//! - `KRAUT_USER_DIR`: user configuration directory
//! - `RUST_LOG`: Tracing filter (default: "info,kraut=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin kraut
//! ```

use kraut::{make_default_local_api, Capability, Error};

fn main() -> anyhow::Result<()> {
    // Initialize tracing; `log` records from the library are bridged in.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kraut=debug".into()),
        )
        .init();

    let (api, error) = make_default_local_api();
    match error {
        Some(Error::NoProjectFound) => {
            tracing::warn!("No project found; run from a directory containing .kraut to enable it")
        }
        Some(e) => return Err(e.into()),
        None => {}
    }

    let routes: serde_json::Map<String, serde_json::Value> = api
        .capabilities()
        .into_iter()
        .map(|capability: Capability| {
            let builder = api.builder_name(&capability).unwrap_or_default().to_string();
            (capability.to_string(), serde_json::Value::String(builder))
        })
        .collect();

    tracing::info!("kraut {} resolved {} capabilities", kraut::VERSION, routes.len());
    println!("{}", serde_json::to_string_pretty(&routes)?);
    Ok(())
}
