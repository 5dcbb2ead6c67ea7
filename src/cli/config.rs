//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::{masked_secret, Config};
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geofence.radius")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    print!("{}", render_config(config));
}

fn render_config(config: &Config) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line("[geofence]".to_string());
    line(format!("radius = {}", config.geofence.radius));
    match config.target() {
        Some(target) => {
            line(format!("target_lat = {}", target.lat));
            line(format!("target_lng = {}", target.lng));
        }
        None => line("# target not set".to_string()),
    }
    line(String::new());

    line("[tracking]".to_string());
    line(format!("interval_ms = {}", config.tracking.interval_ms));
    line(format!("jitter_meters = {}", config.tracking.jitter_meters));
    line(format!("steps = {}", config.tracking.steps));
    line(String::new());

    line("[relay]".to_string());
    line(format!("enabled = {}", config.relay.enabled));
    line(format!("url = \"{}\"", config.relay.url));
    line(format!("timeout_secs = {}", config.relay.timeout_secs));
    line(String::new());

    line("[telegram]".to_string());
    line(format!("api_url = \"{}\"", config.telegram.api_url));
    let status = if config.telegram.bot_token.is_empty() {
        "not configured"
    } else {
        "configured"
    };
    line(format!(
        "bot_token = \"{}\" # {}",
        masked_secret(&config.telegram.bot_token),
        status
    ));
    line(format!("chat_id = \"{}\"", config.telegram.chat_id));
    line(String::new());

    line("[server]".to_string());
    line(format!("host = \"{}\"", config.server.host));
    line(format!("port = {}", config.server.port));
    line(String::new());

    line("[url]".to_string());
    line(format!("default = \"{}\"", config.url.default));
    line(String::new());

    line("[url.providers]".to_string());
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        line(format!("{} = \"{}\"", name, template));
    }

    out
}
