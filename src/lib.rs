//! Minor-hockey league page scraper for Home Assistant.
//!
//! Fetches league pages (schedule, standings, player stats), normalizes the
//! tables into typed records, derives next/last game facts and publishes
//! everything as MQTT discovery sensors. Calendar event creation is gated
//! through a persisted dedup snapshot so repeated runs never duplicate events.

pub mod action;
pub mod facts;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod publish;
pub mod state;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One configured league/category page to scrape and report on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    /// Stable identifier used in sensor ids, MQTT topics and the dedup snapshot.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Lowercase the name and collapse every non-alphanumeric run into a single `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// One scheduled or played game from the schedule table.
///
/// Raw date/time text is always kept alongside the parsed instant so the
/// entry stays displayable even when parsing fails.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntry {
    pub game_number: String,
    pub weekday: String,
    pub date_text: String,
    pub time_text: String,
    /// Zone-aware game start, absent when the raw date is unparsable.
    pub instant: Option<DateTime<Tz>>,
    pub visitor: String,
    pub home: String,
    /// Empty until the game has been played.
    pub result: String,
    pub venue: String,
}

/// One team's row in a league standings table.
#[derive(Debug, Clone, Serialize)]
pub struct StandingsEntry {
    /// Rank within the division, absent when the cell is not an integer.
    pub position: Option<u32>,
    pub team: String,
    pub division: String,
    pub played: Option<u32>,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub draws: Option<u32>,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
    /// Kept as raw text, the source mixes "0.500" and "0,500".
    pub average: Option<String>,
    pub points: Option<u32>,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum RinksideError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("calendar action failed: {0}")]
    Action(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RinksideError>;

/// Application configuration, loadable from a TOML file and overridable
/// from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub targets: Vec<Target>,
    pub entity_prefix: String,
    pub discovery_prefix: String,
    /// IANA zone the league publishes its schedule in.
    pub timezone: String,
    pub state_file: String,
    /// Standings tables with more body rows than this are treated as a
    /// summary container and discarded.
    pub standings_row_ceiling: usize,
    pub mqtt: MqttConfig,
    pub home_assistant: Option<HomeAssistantConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Optional calendar-event collaborator credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    pub url: String,
    pub token: String,
    pub calendar_entity: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            targets: Vec::new(),
            entity_prefix: "rinkside".to_string(),
            discovery_prefix: "homeassistant".to_string(),
            timezone: "America/Toronto".to_string(),
            state_file: "data/dedup.json".to_string(),
            standings_row_ceiling: 15,
            mqtt: MqttConfig::default(),
            home_assistant: None,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        MqttConfig {
            host: "core-mosquitto".to_string(),
            port: 1883,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RinksideError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| RinksideError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Parse the configured zone name into a `Tz`.
    pub fn zone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| RinksideError::Config(format!("Unknown timezone: {}", self.timezone)))
    }
}
