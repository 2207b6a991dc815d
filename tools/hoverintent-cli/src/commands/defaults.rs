//! Print the effective registration defaults.

use hoverintent_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.intent)?);
    eprintln!("(config file: {})", config_file_path().display());
    Ok(())
}
