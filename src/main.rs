//! rinkside CLI
//!
//! Scrapes configured league pages and publishes schedule, standings and
//! next-game sensors to Home Assistant over MQTT.

use clap::Parser;
use rinkside::action::{CalendarAction, HomeAssistantCalendar};
use rinkside::fetch::HttpPageSource;
use rinkside::pipeline::Pipeline;
use rinkside::publish::mqtt::MqttSink;
use rinkside::publish::planner::PublishPlanner;
use rinkside::state::DedupStore;
use rinkside::{Config, HomeAssistantConfig, Result, RinksideError, Target};

#[derive(Parser)]
#[command(name = "rinkside")]
#[command(about = "Scrape minor-hockey league pages into Home Assistant sensors", long_about = None)]
struct Cli {
    /// Config file path (TOML); flags below override file values
    #[arg(short, long)]
    config: Option<String>,

    /// JSON array of targets: [{"name": "...", "url": "..."}]
    #[arg(long)]
    targets_json: Option<String>,

    /// Single target URL, published under the name "default"
    #[arg(long, conflicts_with = "targets_json")]
    url: Option<String>,

    /// Prefix for sensor ids and device names
    #[arg(long)]
    entity_prefix: Option<String>,

    /// MQTT discovery prefix
    #[arg(long)]
    discovery_prefix: Option<String>,

    /// IANA zone the league schedule is published in
    #[arg(long)]
    timezone: Option<String>,

    /// Path of the dedup snapshot file
    #[arg(long)]
    state_file: Option<String>,

    #[arg(long)]
    mqtt_host: Option<String>,

    #[arg(long)]
    mqtt_port: Option<u16>,

    #[arg(long)]
    mqtt_user: Option<String>,

    #[arg(long)]
    mqtt_pass: Option<String>,

    /// Home Assistant base URL, enables calendar event creation
    #[arg(long, requires = "ha_token", requires = "calendar_entity")]
    ha_url: Option<String>,

    /// Home Assistant long-lived access token
    #[arg(long)]
    ha_token: Option<String>,

    /// Calendar entity to create next-game events on
    #[arg(long)]
    calendar_entity: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let zone = config.zone()?;

    let page_source = HttpPageSource::new();
    let client_id = format!("{}_{}", config.entity_prefix, chrono::Utc::now().timestamp());
    let mut sink = MqttSink::connect(&config.mqtt, &client_id)?;
    let mut store = DedupStore::load(&config.state_file);

    let calendar = config.home_assistant.as_ref().map(HomeAssistantCalendar::new);
    let action = match (&calendar, &config.home_assistant) {
        (Some(c), Some(ha)) => Some((c as &dyn CalendarAction, ha.calendar_entity.clone())),
        _ => None,
    };

    let planner = PublishPlanner::new(&config.discovery_prefix, &config.entity_prefix);

    {
        let mut pipeline = Pipeline::new(
            zone,
            config.standings_row_ceiling,
            planner,
            &page_source,
            &mut sink,
            action,
            &mut store,
        );
        pipeline.run(&config.targets);
    }

    sink.disconnect();
    Ok(())
}

/// Load the optional config file, then layer CLI overrides on top.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(json) = &cli.targets_json {
        config.targets = serde_json::from_str(json)
            .map_err(|e| RinksideError::Config(format!("Invalid targets JSON: {}", e)))?;
    } else if let Some(url) = &cli.url {
        config.targets = vec![Target {
            name: "default".to_string(),
            url: url.clone(),
        }];
    }
    if config.targets.is_empty() {
        return Err(RinksideError::Config("no targets configured".to_string()));
    }

    if let Some(prefix) = &cli.entity_prefix {
        config.entity_prefix = prefix.clone();
    }
    if let Some(prefix) = &cli.discovery_prefix {
        config.discovery_prefix = prefix.clone();
    }
    if let Some(zone) = &cli.timezone {
        config.timezone = zone.clone();
    }
    if let Some(path) = &cli.state_file {
        config.state_file = path.clone();
    }
    if let Some(host) = &cli.mqtt_host {
        config.mqtt.host = host.clone();
    }
    if let Some(port) = cli.mqtt_port {
        config.mqtt.port = port;
    }
    if let Some(user) = &cli.mqtt_user {
        config.mqtt.username = user.clone();
    }
    if let Some(pass) = &cli.mqtt_pass {
        config.mqtt.password = pass.clone();
    }

    if let (Some(url), Some(token), Some(entity)) =
        (&cli.ha_url, &cli.ha_token, &cli.calendar_entity)
    {
        config.home_assistant = Some(HomeAssistantConfig {
            url: url.clone(),
            token: token.clone(),
            calendar_entity: entity.clone(),
        });
    }

    Ok(config)
}
