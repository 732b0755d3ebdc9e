use chrono::{DateTime, Local, SecondsFormat};

use crate::{
    api::home_assistant::{Api, Attributes, State},
    cli::HomeAssistantEntityArgs,
    core::schedule::Schedule,
    prelude::*,
    quantity::percent::Percent,
};

/// Pushes the schedule to Home Assistant, one entity at a time.
pub struct Publisher<'a> {
    api: &'a Api,
    entities: &'a HomeAssistantEntityArgs,
}

#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PublishReport {
    pub n_written: usize,
    pub n_failed: usize,
}

impl<'a> Publisher<'a> {
    pub const fn new(api: &'a Api, entities: &'a HomeAssistantEntityArgs) -> Self {
        Self { api, entities }
    }

    /// Write every value independently: a failed write does not prevent the others.
    #[instrument(skip_all, name = "Publishing the schedule…")]
    pub async fn publish(&self, schedule: &Schedule) -> PublishReport {
        let mut report = PublishReport::default();
        let entities = self.entities;
        report.record(
            &entities.discharge_start,
            self.set_timestamp(&entities.discharge_start, "Discharge start", schedule.discharge_start)
                .await,
        );
        report.record(
            &entities.max_reserve_start,
            self.set_timestamp(
                &entities.max_reserve_start,
                "Max reserve start",
                schedule.recovery_start,
            )
            .await,
        );
        report.record(
            &entities.clean_backup_start,
            self.set_timestamp(
                &entities.clean_backup_start,
                "Clean backup start",
                schedule.clean_backup_start(),
            )
            .await,
        );
        report.record(
            &entities.discharge_target,
            self.set_percent(&entities.discharge_target, "Discharge target", schedule.discharge_target)
                .await,
        );
        report.record(
            &entities.max_reserve_target,
            self.set_percent(
                &entities.max_reserve_target,
                "Max reserve target",
                schedule.recovery_target,
            )
            .await,
        );
        report
    }

    async fn set_timestamp(
        &self,
        entity_id: &str,
        friendly_name: &'static str,
        timestamp: DateTime<Local>,
    ) -> Result {
        let state = State {
            value: timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            attributes: Attributes {
                friendly_name: Some(friendly_name),
                device_class: Some("timestamp"),
                ..Attributes::default()
            },
        };
        self.api.set_state(entity_id, &state).await
    }

    async fn set_percent(
        &self,
        entity_id: &str,
        friendly_name: &'static str,
        percent: Percent,
    ) -> Result {
        let state = State {
            value: (percent.0 * 10.0).round() / 10.0,
            attributes: Attributes {
                friendly_name: Some(friendly_name),
                unit_of_measurement: Some("%"),
                ..Attributes::default()
            },
        };
        self.api.set_state(entity_id, &state).await
    }
}

impl PublishReport {
    fn record(&mut self, entity_id: &str, result: Result) {
        match result {
            Ok(()) => {
                self.n_written += 1;
            }
            Err(error) => {
                warn!(entity_id, "failed to publish: {error:#}");
                self.n_failed += 1;
            }
        }
    }
}
