use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub month_record: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub url_template: String,
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.eco-visio.fr/api/aladdin/1.0.0/pbl/publicwebpageplus/data/{id}?interval=4&flowIds={id}".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub slack_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XConfig {
    pub api_base: String,
}

impl Default for XConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twitter.com/2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    pub name: String,
    pub counter_id: String,
    pub hashtag: Option<String>,
    pub seed: Option<u64>,
    pub slack_url: Option<String>,
    pub x_access_token: Option<String>,
}

impl CounterConfig {
    fn new(name: &str, counter_id: &str, hashtag: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            counter_id: counter_id.to_string(),
            hashtag: Some(hashtag.to_string()),
            seed: Some(seed),
            slack_url: None,
            x_access_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub selection: SelectionConfig,
    pub fetch: FetchConfig,
    pub alerts: AlertConfig,
    pub x: XConfig,
    pub counters: Vec<CounterConfig>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            fetch: FetchConfig::default(),
            alerts: AlertConfig::default(),
            x: XConfig::default(),
            counters: vec![
                CounterConfig::new("rivoli", "100154889", "#CompteurRivoli", 1),
                CounterConfig::new("sebastopol", "100158705", "#CompteurSebastopol", 2),
            ],
        }
    }
}

impl BotConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                BotConfig::from_toml(&contents)?
            } else {
                BotConfig::default()
            }
        } else {
            BotConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|err| format!("failed to parse config: {}", err))
    }

    pub fn counter(&self, name: &str) -> Option<&CounterConfig> {
        self.counters
            .iter()
            .find(|counter| counter.name.eq_ignore_ascii_case(name))
    }

    pub fn counter_names(&self) -> Vec<String> {
        self.counters.iter().map(|counter| counter.name.clone()).collect()
    }

    fn apply_env_overrides(&mut self) {
        if let Some(template) = non_empty_var("ECO_COUNTER_URL_TEMPLATE") {
            self.fetch.url_template = template;
        }
        if let Some(url) = non_empty_var("SLACK_ALERT_URL") {
            self.alerts.slack_url = Some(url);
        }
        if let Some(api_base) = non_empty_var("X_API_BASE") {
            self.x.api_base = api_base;
        }
        if let Some(flag) = non_empty_var("SELECTION_MONTH_RECORD") {
            if let Ok(value) = flag.parse::<bool>() {
                self.selection.month_record = value;
            }
        }
        for counter in self.counters.iter_mut() {
            let prefix = counter.name.to_uppercase();
            if let Some(url) = non_empty_var(&format!("{}_SLACK_URL", prefix)) {
                counter.slack_url = Some(url);
            }
            if let Some(token) = non_empty_var(&format!("{}_X_ACCESS_TOKEN", prefix)) {
                counter.x_access_token = Some(token);
            }
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn default_config_path() -> Option<PathBuf> {
    non_empty_var("BOT_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/bot.toml")))
}
