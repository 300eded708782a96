//! Turns derived facts into MQTT discovery sensor payloads.
//!
//! Each logical sensor is a triple of retained messages: a discovery config
//! (qos 1), a short state scalar and a JSON attributes document. Sensor ids
//! are deterministic (`{entity_prefix}_{slug}_{label}`) so repeated runs
//! update the same entities.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{json, Value};

use crate::facts::GameFacts;
use crate::publish::{QoS, SinkMessage};
use crate::{Result, StandingsEntry};

pub struct PublishPlanner {
    discovery_prefix: String,
    entity_prefix: String,
}

/// Everything gathered for one target on a successful run.
pub struct TargetReport<'a> {
    pub facts: &'a GameFacts,
    pub standings: &'a [StandingsEntry],
    pub players: &'a [BTreeMap<String, String>],
    pub updated: DateTime<Tz>,
}

impl PublishPlanner {
    pub fn new(discovery_prefix: &str, entity_prefix: &str) -> Self {
        PublishPlanner {
            discovery_prefix: discovery_prefix.to_string(),
            entity_prefix: entity_prefix.to_string(),
        }
    }

    /// The full sensor set for a target that was scraped successfully.
    pub fn plan_success(&self, slug: &str, report: &TargetReport) -> Result<Vec<SinkMessage>> {
        let updated = report.updated.to_rfc3339();
        let mut messages = Vec::new();

        messages.extend(self.sensor(
            slug,
            "status",
            "mdi:check-circle",
            "success",
            json!({ "updated": updated }),
        )?);

        let next_state = report
            .facts
            .next
            .as_ref()
            .map(|e| e.date_text.clone())
            .unwrap_or_else(|| "aucun".to_string());
        messages.extend(self.sensor(
            slug,
            "prochain_match",
            "mdi:calendar-clock",
            &next_state,
            json!({
                "next_game": report.facts.next,
                "upcoming": report.facts.upcoming,
                "updated": updated,
            }),
        )?);

        let last_state = report
            .facts
            .last
            .as_ref()
            .map(|e| e.result.clone())
            .unwrap_or_else(|| "aucun".to_string());
        messages.extend(self.sensor(
            slug,
            "dernier_match",
            "mdi:hockey-puck",
            &last_state,
            json!({
                "last_game": report.facts.last,
                "updated": updated,
            }),
        )?);

        messages.extend(self.sensor(
            slug,
            "classement",
            "mdi:trophy",
            &format!("{} équipes", report.standings.len()),
            json!({
                "standings": report.standings,
                "updated": updated,
            }),
        )?);

        messages.extend(self.sensor(
            slug,
            "stats_joueurs",
            "mdi:hockey-sticks",
            &format!("{} joueurs", report.players.len()),
            json!({
                "players": report.players,
                "updated": updated,
            }),
        )?);

        Ok(messages)
    }

    /// On failure only the status sensor is published, so stale retained
    /// data for the other sensors is left untouched.
    pub fn plan_failure(
        &self,
        slug: &str,
        error: &str,
        updated: DateTime<Tz>,
    ) -> Result<Vec<SinkMessage>> {
        self.sensor(
            slug,
            "status",
            "mdi:alert-circle",
            error,
            json!({ "updated": updated.to_rfc3339() }),
        )
    }

    /// Build the config/state/attributes triple for one logical sensor.
    fn sensor(
        &self,
        slug: &str,
        label: &str,
        icon: &str,
        state: &str,
        mut attributes: Value,
    ) -> Result<Vec<SinkMessage>> {
        let sensor_id = format!("{}_{}_{}", self.entity_prefix, slug, label);
        let base = format!("{}/sensor/{}", self.discovery_prefix, sensor_id);
        let state_topic = format!("{}/state", base);
        let attr_topic = format!("{}/attributes", base);

        let config = json!({
            "name": format!("{} – {}", self.entity_prefix.to_uppercase(), title_case(label)),
            "uniq_id": sensor_id,
            "stat_t": state_topic,
            "json_attr_t": attr_topic,
            "dev": {
                "name": format!("{} {}", self.entity_prefix.to_uppercase(), slug),
                "ids": [format!("{}_{}", self.entity_prefix, slug)],
            },
            "icon": icon,
        });

        replace_nulls(&mut attributes);

        Ok(vec![
            SinkMessage {
                topic: format!("{}/config", base),
                payload: serde_json::to_string(&config)?,
                retain: true,
                qos: QoS::AtLeastOnce,
            },
            SinkMessage {
                topic: attr_topic,
                payload: serde_json::to_string(&attributes)?,
                retain: true,
                qos: QoS::AtMostOnce,
            },
            SinkMessage {
                topic: state_topic,
                payload: state.to_string(),
                retain: true,
                qos: QoS::AtMostOnce,
            },
        ])
    }
}

/// "prochain_match" → "Prochain Match"
fn title_case(label: &str) -> String {
    label
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Some MQTT consumers choke on JSON nulls in attributes; swap them for
/// empty strings, recursively.
fn replace_nulls(value: &mut Value) {
    match value {
        Value::Null => *value = Value::String(String::new()),
        Value::Array(items) => items.iter_mut().for_each(replace_nulls),
        Value::Object(map) => map.values_mut().for_each(replace_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Toronto;

    fn planner() -> PublishPlanner {
        PublishPlanner::new("homeassistant", "rinkside")
    }

    fn updated() -> DateTime<Tz> {
        Toronto.with_ymd_and_hms(2024, 10, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sensor_triple_topics() {
        let messages = planner()
            .sensor("novice_a", "classement", "mdi:trophy", "5 équipes", json!({}))
            .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0].topic,
            "homeassistant/sensor/rinkside_novice_a_classement/config"
        );
        assert_eq!(
            messages[1].topic,
            "homeassistant/sensor/rinkside_novice_a_classement/attributes"
        );
        assert_eq!(
            messages[2].topic,
            "homeassistant/sensor/rinkside_novice_a_classement/state"
        );
        assert!(messages.iter().all(|m| m.retain));
        assert_eq!(messages[0].qos, QoS::AtLeastOnce);
        assert_eq!(messages[2].qos, QoS::AtMostOnce);
        assert_eq!(messages[2].payload, "5 équipes");
    }

    #[test]
    fn test_config_payload_fields() {
        let messages = planner()
            .sensor("novice_a", "prochain_match", "mdi:calendar-clock", "x", json!({}))
            .unwrap();
        let config: Value = serde_json::from_str(&messages[0].payload).unwrap();
        assert_eq!(config["uniq_id"], "rinkside_novice_a_prochain_match");
        assert_eq!(config["name"], "RINKSIDE – Prochain Match");
        assert_eq!(config["icon"], "mdi:calendar-clock");
        assert_eq!(
            config["stat_t"],
            "homeassistant/sensor/rinkside_novice_a_prochain_match/state"
        );
        assert_eq!(config["dev"]["ids"][0], "rinkside_novice_a");
    }

    #[test]
    fn test_nulls_replaced_in_attributes() {
        let messages = planner()
            .sensor(
                "novice_a",
                "prochain_match",
                "mdi:calendar-clock",
                "aucun",
                json!({ "next_game": null, "nested": { "venue": null } }),
            )
            .unwrap();
        let attrs: Value = serde_json::from_str(&messages[1].payload).unwrap();
        assert_eq!(attrs["next_game"], "");
        assert_eq!(attrs["nested"]["venue"], "");
    }

    #[test]
    fn test_plan_failure_only_status() {
        let messages = planner()
            .plan_failure("novice_a", "extraction failed: no table", updated())
            .unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].topic.contains("rinkside_novice_a_status"));
        assert_eq!(messages[2].payload, "extraction failed: no table");
    }

    #[test]
    fn test_plan_success_covers_all_sensors() {
        let facts = GameFacts::default();
        let report = TargetReport {
            facts: &facts,
            standings: &[],
            players: &[],
            updated: updated(),
        };
        let messages = planner().plan_success("novice_a", &report).unwrap();
        // Five sensors, three messages each.
        assert_eq!(messages.len(), 15);
        let topics: Vec<&str> = messages.iter().map(|m| m.topic.as_str()).collect();
        for label in ["status", "prochain_match", "dernier_match", "classement", "stats_joueurs"] {
            assert!(topics
                .iter()
                .any(|t| t.contains(&format!("rinkside_novice_a_{}", label))));
        }
        // Empty facts serialize as empty strings, not nulls.
        let next_attrs: Value = serde_json::from_str(&messages[4].payload).unwrap();
        assert_eq!(next_attrs["next_game"], "");
    }
}
