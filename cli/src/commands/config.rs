//! `relops config` — show and set configuration values.

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::output::json;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Run the config command.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Set { key, value } => set_config(app, &key, &value),
    }
}

fn show_config(app: &AppContext) -> Result<()> {
    let config = app.config()?;
    let path = app.config_store.path()?;

    if app.json {
        let entries: serde_json::Map<String, serde_json::Value> = config
            .entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        println!(
            "{}",
            json::to_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "settings": entries,
            }))?
        );
        return Ok(());
    }

    app.output.kv("file", &path.display().to_string());
    for (key, value) in config.entries() {
        app.output.kv(key, &value);
    }
    Ok(())
}

fn set_config(app: &AppContext, key: &str, value: &str) -> Result<()> {
    let mut config = app.config()?;
    config.set(key, value)?;
    app.config_store.save(&config)?;
    app.output.success(&format!("Set {key} = {value}"));
    Ok(())
}
