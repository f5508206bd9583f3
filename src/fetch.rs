use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::series::CountSeries;

/// Client for the counter API, which answers with `[["MM/DD/YYYY", "count"], ...]`.
#[derive(Clone)]
pub struct CounterClient {
    url_template: String,
    client: reqwest::Client,
}

impl CounterClient {
    pub fn from_config(config: &BotConfig) -> Result<Self, String> {
        let timeout = Duration::from_millis(config.fetch.timeout_ms);
        CounterClient::new(config.fetch.url_template.clone(), timeout)
    }

    pub fn new(url_template: String, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("failed to build counter client: {}", err))?;
        Ok(Self {
            url_template,
            client,
        })
    }

    pub async fn fetch_series(&self, counter_id: &str) -> Result<CountSeries, String> {
        let url = self.url_template.replace("{id}", counter_id);
        debug!(url = %url, "fetching counter data");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| format!("counter request failed: {}", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("counter error {}: {}", status, body));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| format!("counter response parse failed: {}", err))?;
        let series = series_from_payload(&payload)?;
        info!(
            counter_id,
            days = series.len(),
            last_day = ?series.last_day(),
            "fetched counter series"
        );
        Ok(series)
    }
}

/// Validates the raw answer shape before handing the pairs to the series parser.
pub fn series_from_payload(payload: &serde_json::Value) -> Result<CountSeries, String> {
    let rows = payload
        .as_array()
        .ok_or_else(|| format!("expecting a list, received {}", json_kind(payload)))?;

    let mut pairs = Vec::with_capacity(rows.len());
    for row in rows {
        let pair = row
            .as_array()
            .ok_or_else(|| format!("expecting a list, received {}", json_kind(row)))?;
        if pair.len() != 2 {
            return Err(format!(
                "expecting list of length 2, received list of length {}",
                pair.len()
            ));
        }
        let day = pair[0]
            .as_str()
            .ok_or_else(|| format!("expecting a string, received {}", json_kind(&pair[0])))?;
        let count = pair[1]
            .as_str()
            .ok_or_else(|| format!("expecting a string, received {}", json_kind(&pair[1])))?;
        pairs.push((day.to_string(), count.to_string()));
    }

    CountSeries::from_pairs(&pairs).map_err(|err| err.to_string())
}

pub fn load_series(path: &Path) -> Result<CountSeries, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let series = if is_csv(path) {
        CountSeries::from_csv(&contents)
    } else {
        CountSeries::from_json(&contents)
    };
    series.map_err(|err| format!("failed to load {}: {}", path.display(), err))
}

pub fn dump_series(series: &CountSeries, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create output dir: {}", err))?;
        }
    }
    let payload = if is_csv(path) {
        series.to_csv()
    } else {
        series.to_json().map_err(|err| err.to_string())?
    };
    std::fs::write(path, payload)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
