//! Calendar event creation against the Home Assistant REST API.
//!
//! This is the side-effecting collaborator gated by the dedup store; a
//! failed call is an error for that call only and the gate stays closed,
//! so the next run retries.

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::json;

use crate::{HomeAssistantConfig, Result, RinksideError};

/// Creates one calendar event per call.
pub trait CalendarAction {
    fn create_event(
        &self,
        entity_id: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        summary: &str,
        description: &str,
    ) -> Result<()>;
}

/// Home Assistant `calendar.create_event` service call over REST.
pub struct HomeAssistantCalendar {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl HomeAssistantCalendar {
    pub fn new(config: &HomeAssistantConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent("rinkside/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        HomeAssistantCalendar {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }
}

impl CalendarAction for HomeAssistantCalendar {
    fn create_event(
        &self,
        entity_id: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        summary: &str,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}/api/services/calendar/create_event", self.base_url);
        let body = json!({
            "entity_id": entity_id,
            "summary": summary,
            "description": description,
            "start_date_time": start.to_rfc3339(),
            "end_date_time": end.to_rfc3339(),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            return Err(RinksideError::Action(format!(
                "HTTP {} creating event on {}",
                response.status(),
                entity_id
            )));
        }

        log::info!("Created calendar event '{}' on {}", summary, entity_id);
        Ok(())
    }
}
