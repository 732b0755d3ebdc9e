use clap::Parser;
use reqwest::Url;

use crate::{api::home_assistant, prelude::*};

#[derive(Parser)]
pub struct HomeAssistantArgs {
    #[clap(flatten)]
    pub connection: HomeAssistantConnectionArgs,

    #[clap(flatten)]
    pub entities: HomeAssistantEntityArgs,
}

#[derive(Parser)]
pub struct HomeAssistantConnectionArgs {
    /// Home Assistant API access token.
    #[clap(
        long = "home-assistant-access-token",
        env = "HOME_ASSISTANT_ACCESS_TOKEN",
        hide_env_values = true
    )]
    pub access_token: Option<String>,

    /// Home Assistant API base URL. For example: `http://localhost:8123/api`.
    #[clap(id = "home_assistant_base_url", long = "home-assistant-api-base-url", env = "HOME_ASSISTANT_API_BASE_URL")]
    pub base_url: Option<Url>,
}

impl HomeAssistantConnectionArgs {
    pub fn try_new_client(&self) -> Result<home_assistant::Api> {
        let base_url = self.base_url.clone().context("Home Assistant API base URL is required")?;
        let access_token =
            self.access_token.as_deref().context("Home Assistant access token is required")?;
        home_assistant::Api::try_new(access_token, base_url)
    }
}

/// Entities that receive the schedule.
#[derive(Parser)]
pub struct HomeAssistantEntityArgs {
    #[clap(
        long = "discharge-start-entity-id",
        env = "DISCHARGE_START_ENTITY_ID",
        default_value = "sensor.surplus_discharge_start"
    )]
    pub discharge_start: String,

    #[clap(
        long = "max-reserve-start-entity-id",
        env = "MAX_RESERVE_START_ENTITY_ID",
        default_value = "sensor.surplus_max_reserve_start"
    )]
    pub max_reserve_start: String,

    #[clap(
        long = "clean-backup-start-entity-id",
        env = "CLEAN_BACKUP_START_ENTITY_ID",
        default_value = "sensor.surplus_clean_backup_start"
    )]
    pub clean_backup_start: String,

    #[clap(
        long = "discharge-target-entity-id",
        env = "DISCHARGE_TARGET_ENTITY_ID",
        default_value = "sensor.surplus_discharge_target"
    )]
    pub discharge_target: String,

    #[clap(
        long = "max-reserve-target-entity-id",
        env = "MAX_RESERVE_TARGET_ENTITY_ID",
        default_value = "sensor.surplus_max_reserve_target"
    )]
    pub max_reserve_target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Args {
        #[clap(flatten)]
        home_assistant: HomeAssistantArgs,
    }

    #[test]
    fn test_default_entities() {
        let args = Args::parse_from(["surplus"]).home_assistant;
        assert_eq!(args.entities.discharge_start, "sensor.surplus_discharge_start");
        assert_eq!(args.entities.max_reserve_target, "sensor.surplus_max_reserve_target");
    }

    #[test]
    fn test_client_requires_connection() {
        let args = Args::parse_from([
            "surplus",
            "--home-assistant-api-base-url=http://localhost:8123/api",
        ])
        .home_assistant;
        assert!(args.connection.try_new_client().is_err());

        let args = Args::parse_from([
            "surplus",
            "--home-assistant-api-base-url=http://localhost:8123/api",
            "--home-assistant-access-token=token",
        ])
        .home_assistant;
        assert!(args.connection.try_new_client().is_ok());
    }
}
