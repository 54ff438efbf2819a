use std::time::Duration;

use tracing::trace;

use crate::app_config::UpstreamConfig;
use crate::catalog::DatasetDefinition;
use crate::common::RegionCode;
use crate::error::FetchError;
use crate::upstream::{Fetched, response};

/// 📡 Thin wrapper over `reqwest` carrying the base URL, the service key,
/// and the per-request timeout. One of these is shared across every worker
/// and every dataset — reqwest pools connections internally, so hoarding
/// extra clients impresses nobody.
#[derive(Debug)]
pub(crate) struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl UpstreamClient {
    pub(crate) fn new(config: &UpstreamConfig, service_key: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    /// 🎯 Issues one GET for `region` against `def`'s endpoint and parses
    /// what comes back. No retry on any failure class — one region, one
    /// shot, next caller please.
    pub(crate) async fn fetch(
        &self,
        def: &DatasetDefinition,
        region: &RegionCode,
    ) -> Result<Fetched, FetchError> {
        let url = format!("{}/{}", self.base_url, def.path);
        let mut query: Vec<(&str, &str)> = vec![
            ("serviceKey", self.service_key.as_str()),
            ("STDG_CD", region.as_str()),
        ];
        if let Some(crop) = &def.crop_code {
            query.push(("soil_Crop_CD", crop.as_str()));
        }

        trace!("📡 [{}] asking about region {}", def.name, region);
        let body = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        response::parse(&body)
    }
}
