// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Range statistics read through Grafana's datasource query API.
//!
//! Grafana proxies the SQL query to its configured datasource and answers
//! with data frames: a schema listing column names and a column-major array
//! of values. Only the first row of the first frame is used.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ProviderError;

use super::{RangeStats, RangeStatsProvider};

/// Query used when none is configured. `$car_id` is substituted per call.
const DEFAULT_QUERY: &str = "SELECT projected_range, avg_battery_level, \
     avg_usable_battery_level, current_odometer \
     FROM range_stats WHERE car_id = $car_id";

/// Connection settings for a Grafana instance.
///
/// # Examples
///
/// ```
/// use carwatch::provider::GrafanaConfig;
/// use std::time::Duration;
///
/// let config = GrafanaConfig::new("http://grafana:3000", "P1809F7CD0C75ACF3")
///     .with_token("glsa_xxx")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.query_url(), "http://grafana:3000/api/ds/query");
/// ```
#[derive(Debug, Clone)]
pub struct GrafanaConfig {
    base_url: String,
    datasource_uid: String,
    token: Option<String>,
    query: String,
    timeout: Duration,
}

impl GrafanaConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given Grafana base URL and datasource.
    #[must_use]
    pub fn new(base_url: impl Into<String>, datasource_uid: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            datasource_uid: datasource_uid.into(),
            token: None,
            query: DEFAULT_QUERY.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the service account token sent as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replaces the SQL query. `$car_id` is substituted with the vehicle id.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the datasource query endpoint.
    #[must_use]
    pub fn query_url(&self) -> String {
        format!("{}/api/ds/query", self.base_url)
    }

    /// Creates a provider from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_provider(self) -> Result<GrafanaRangeProvider, ProviderError> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(GrafanaRangeProvider {
            client,
            config: self,
        })
    }
}

/// [`RangeStatsProvider`] backed by a Grafana datasource.
#[derive(Debug, Clone)]
pub struct GrafanaRangeProvider {
    client: Client,
    config: GrafanaConfig,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: HashMap<String, QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    frames: Vec<Frame>,
}

#[derive(Debug, Deserialize)]
struct Frame {
    schema: Schema,
    data: FrameData,
}

#[derive(Debug, Deserialize)]
struct Schema {
    fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FrameData {
    values: Vec<Vec<Value>>,
}

impl GrafanaRangeProvider {
    fn request_body(&self, car_id: u32) -> Value {
        let sql = self.config.query.replace("$car_id", &car_id.to_string());
        json!({
            "queries": [{
                "refId": "A",
                "datasource": { "uid": self.config.datasource_uid },
                "rawSql": sql,
                "format": "table",
            }],
            "from": "now-5m",
            "to": "now",
        })
    }
}

impl RangeStatsProvider for GrafanaRangeProvider {
    async fn range_stats(&self, car_id: u32) -> Result<RangeStats, ProviderError> {
        let mut request = self
            .client
            .post(self.config.query_url())
            .json(&self.request_body(car_id));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(car_id, "Querying range statistics");

        let body = request.send().await?.error_for_status()?.text().await?;
        parse_range_stats(&body)
    }
}

/// Extracts the first row of the first frame into [`RangeStats`].
fn parse_range_stats(body: &str) -> Result<RangeStats, ProviderError> {
    let response: QueryResponse = serde_json::from_str(body)?;
    let frame = response
        .results
        .get("A")
        .and_then(|result| result.frames.first())
        .ok_or(ProviderError::EmptyResult)?;

    let column = |name: &str| -> Result<f64, ProviderError> {
        let index = frame
            .schema
            .fields
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| ProviderError::MissingField(name.to_string()))?;
        let values = frame
            .data
            .values
            .get(index)
            .ok_or_else(|| ProviderError::MissingField(name.to_string()))?;
        values
            .first()
            .ok_or(ProviderError::EmptyResult)?
            .as_f64()
            .ok_or_else(|| ProviderError::MissingField(name.to_string()))
    };

    Ok(RangeStats {
        projected_range: column("projected_range")?,
        avg_battery_level: column("avg_battery_level")?,
        avg_usable_battery_level: column("avg_usable_battery_level")?,
        current_odometer: column("current_odometer")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_body(values: &Value) -> String {
        json!({
            "results": {
                "A": {
                    "status": 200,
                    "frames": [{
                        "schema": {
                            "fields": [
                                { "name": "projected_range" },
                                { "name": "avg_battery_level" },
                                { "name": "avg_usable_battery_level" },
                                { "name": "current_odometer" }
                            ]
                        },
                        "data": { "values": values }
                    }]
                }
            }
        })
        .to_string()
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = GrafanaConfig::new("http://grafana:3000/", "uid");
        assert_eq!(config.query_url(), "http://grafana:3000/api/ds/query");
    }

    #[test]
    fn request_body_substitutes_car_id() {
        let provider = GrafanaConfig::new("http://grafana", "uid-1")
            .with_query("SELECT * FROM x WHERE car_id = $car_id")
            .into_provider()
            .unwrap();

        let body = provider.request_body(7);
        assert_eq!(
            body["queries"][0]["rawSql"],
            "SELECT * FROM x WHERE car_id = 7"
        );
        assert_eq!(body["queries"][0]["datasource"]["uid"], "uid-1");
    }

    #[test]
    fn parses_first_row() {
        let body = frame_body(&json!([[375.0, 1.0], [81.0, 1.0], [80.0, 1.0], [42000.5, 1.0]]));
        let stats = parse_range_stats(&body).unwrap();

        assert!((stats.projected_range - 375.0).abs() < f64::EPSILON);
        assert!((stats.avg_usable_battery_level - 80.0).abs() < f64::EPSILON);
        assert!((stats.current_odometer - 42000.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_column_is_empty_result() {
        let body = frame_body(&json!([[], [], [], []]));
        assert!(matches!(
            parse_range_stats(&body),
            Err(ProviderError::EmptyResult)
        ));
    }

    #[test]
    fn null_value_is_missing_field() {
        let body = frame_body(&json!([[null], [81.0], [80.0], [1.0]]));
        assert!(matches!(
            parse_range_stats(&body),
            Err(ProviderError::MissingField(name)) if name == "projected_range"
        ));
    }

    #[test]
    fn no_frames_is_empty_result() {
        let body = json!({ "results": { "A": { "frames": [] } } }).to_string();
        assert!(matches!(
            parse_range_stats(&body),
            Err(ProviderError::EmptyResult)
        ));
    }

    #[test]
    fn invalid_json_is_json_error() {
        assert!(matches!(
            parse_range_stats("not json"),
            Err(ProviderError::Json(_))
        ));
    }
}
