use std::fmt::Display;

use reqwest::{
    Client,
    ClientBuilder,
    Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_with::serde_as;

use crate::prelude::*;

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn try_new(access_token: &str, base_url: Url) -> Result<Self> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {access_token}"))?,
        )]);
        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Create or overwrite the entity state.
    #[instrument(skip_all, name = "Setting the entity state…", fields(entity_id = entity_id))]
    pub async fn set_state<V: Display>(&self, entity_id: &str, state: &State<V>) -> Result {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .push("states")
            .push(entity_id);
        self.client.post(url).json(state).send().await?.error_for_status()?;
        debug!(state = %state.value, "updated");
        Ok(())
    }
}

#[must_use]
#[serde_as]
#[derive(Serialize)]
#[serde(bound(serialize = "V: Display"))]
pub struct State<V> {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(rename = "state")]
    pub value: V,

    pub attributes: Attributes,
}

#[must_use]
#[derive(Default, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'static str>,
}
