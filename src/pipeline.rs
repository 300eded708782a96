//! Per-target orchestration.
//!
//! For each configured target: fetch → extract → map → derive → gate the
//! calendar action → publish. One target's failure is recorded as a
//! degraded status sensor and never aborts the rest of the run.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::action::CalendarAction;
use crate::facts::{self, GameFacts};
use crate::fetch::PageSource;
use crate::parse::schedule::ScheduleMapper;
use crate::parse::{standings, stats, tables};
use crate::publish::planner::{PublishPlanner, TargetReport};
use crate::publish::{Sink, SinkMessage};
use crate::state::{dedup_key, DedupStore};
use crate::{Result, StandingsEntry, Target};

pub struct Pipeline<'a> {
    zone: Tz,
    standings_row_ceiling: usize,
    schedule_mapper: ScheduleMapper,
    planner: PublishPlanner,
    page_source: &'a dyn PageSource,
    sink: &'a mut dyn Sink,
    /// Calendar action collaborator plus the target calendar entity id.
    action: Option<(&'a dyn CalendarAction, String)>,
    store: &'a mut DedupStore,
}

struct TargetData {
    facts: GameFacts,
    standings: Vec<StandingsEntry>,
    players: Vec<BTreeMap<String, String>>,
}

impl<'a> Pipeline<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        zone: Tz,
        standings_row_ceiling: usize,
        planner: PublishPlanner,
        page_source: &'a dyn PageSource,
        sink: &'a mut dyn Sink,
        action: Option<(&'a dyn CalendarAction, String)>,
        store: &'a mut DedupStore,
    ) -> Self {
        Pipeline {
            zone,
            standings_row_ceiling,
            schedule_mapper: ScheduleMapper::new(zone),
            planner,
            page_source,
            sink,
            action,
            store,
        }
    }

    /// Process every target sequentially against the current time.
    pub fn run(&mut self, targets: &[Target]) {
        let now = chrono::Utc::now().with_timezone(&self.zone);
        self.run_at(targets, now);
    }

    /// Process every target against a fixed reference instant.
    pub fn run_at(&mut self, targets: &[Target], now: DateTime<Tz>) {
        for target in targets {
            let slug = target.slug();
            log::info!("Processing target {}", target.name);

            let planned = match self.process(target, now) {
                Ok(data) => {
                    self.gate_calendar_event(&slug, &data.facts);
                    let report = TargetReport {
                        facts: &data.facts,
                        standings: &data.standings,
                        players: &data.players,
                        updated: now,
                    };
                    self.planner.plan_success(&slug, &report)
                }
                Err(e) => {
                    log::error!("Target {} failed: {}", target.name, e);
                    self.planner.plan_failure(&slug, &e.to_string(), now)
                }
            };

            match planned {
                Ok(messages) => self.publish_all(messages),
                Err(e) => log::error!("Planning payloads for {} failed: {}", slug, e),
            }
        }
        log::info!("All {} targets processed", targets.len());
    }

    fn process(&mut self, target: &Target, now: DateTime<Tz>) -> Result<TargetData> {
        let standings_html = self.page_source.fetch(&tab_url(&target.url, "standings"))?;
        let standings_tables =
            tables::extract_tables(&standings_html, Some(self.standings_row_ceiling));
        let standings = standings::map_all(&standings_tables);

        let schedule_html = self.page_source.fetch(&tab_url(&target.url, "schedule"))?;
        let schedule_table = tables::extract_table(&schedule_html, None)?;
        let entries = self.schedule_mapper.map_rows(&schedule_table.rows);
        let facts = facts::derive(&entries, now);

        // Player stats are nice-to-have; a missing table degrades quietly.
        let players = match self
            .page_source
            .fetch(&tab_url(&target.url, "playerstats"))
            .and_then(|html| tables::extract_table(&html, None))
        {
            Ok(table) => stats::map_rows(&table),
            Err(e) => {
                log::warn!("No player stats for {}: {}", target.name, e);
                Vec::new()
            }
        };

        Ok(TargetData {
            facts,
            standings,
            players,
        })
    }

    /// Create a calendar event for the next game, but only when its dedup
    /// key differs from the one last acted upon. The store is advanced and
    /// flushed only after the action succeeds.
    fn gate_calendar_event(&mut self, slug: &str, facts: &GameFacts) {
        let Some((action, entity_id)) = &self.action else {
            return;
        };
        let Some(next) = &facts.next else {
            return;
        };
        let Some(start) = next.instant else {
            return;
        };

        let key = dedup_key(slug, start);
        if self.store.get(slug) == Some(key.as_str()) {
            log::debug!("Next game for {} unchanged, not creating an event", slug);
            return;
        }

        let summary = format!("{} @ {}", next.visitor, next.home);
        let end = start + chrono::Duration::hours(2);
        match action.create_event(entity_id, start, end, &summary, &next.venue) {
            Ok(()) => {
                self.store.set(slug, &key);
                if let Err(e) = self.store.flush() {
                    log::warn!("Failed to persist dedup snapshot: {}", e);
                }
            }
            Err(e) => log::error!("Calendar event for {} failed: {}", slug, e),
        }
    }

    fn publish_all(&mut self, messages: Vec<SinkMessage>) {
        for message in messages {
            if let Err(e) = self.sink.publish(&message) {
                log::error!("Publish to {} failed: {}", message.topic, e);
            }
        }
    }
}

/// Append the tab query parameter the league site uses for its sub-pages.
fn tab_url(base: &str, tab: &str) -> String {
    if base.contains('?') {
        format!("{}&tab={}", base, tab)
    } else {
        format!("{}?tab={}", base, tab)
    }
}
