use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compose::Message;
use crate::config::{BotConfig, CounterConfig};

/// Publication target selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Output {
    /// Print to stdout
    Std,
    /// Post to the counter's Slack webhook
    Slack,
    /// Post on X
    #[value(alias = "twitter")]
    X,
}

impl Output {
    pub fn as_str(&self) -> &'static str {
        match self {
            Output::Std => "std",
            Output::Slack => "slack",
            Output::X => "x",
        }
    }
}

/// Where a finished message goes. Built once by the caller and handed around.
#[derive(Clone)]
pub enum Publisher {
    StdOut,
    Slack(SlackPublisher),
    X(XPublisher),
}

impl Publisher {
    /// `slack_url` takes precedence over the counter's configured webhook.
    pub fn for_counter(
        output: Output,
        counter: Option<&CounterConfig>,
        config: &BotConfig,
        slack_url: Option<&str>,
    ) -> Result<Self, String> {
        match output {
            Output::Std => Ok(Publisher::StdOut),
            Output::Slack => {
                let url = slack_url
                    .map(str::to_string)
                    .or_else(|| counter.and_then(|counter| counter.slack_url.clone()))
                    .ok_or_else(|| "no slack url given or configured for this counter".to_string())?;
                Ok(Publisher::Slack(SlackPublisher::new(url)))
            }
            Output::X => {
                let token = counter
                    .and_then(|counter| counter.x_access_token.clone())
                    .ok_or_else(|| "no X access token configured for this counter".to_string())?;
                Ok(Publisher::X(XPublisher::new(config.x.api_base.clone(), token)))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Publisher::StdOut => "stdout",
            Publisher::Slack(_) => "slack",
            Publisher::X(_) => "x",
        }
    }

    pub async fn publish(&self, message: &Message) -> Result<(), String> {
        match self {
            Publisher::StdOut => {
                println!("{}", message);
                Ok(())
            }
            Publisher::Slack(slack) => slack.post_text(message.content()).await,
            Publisher::X(x) => x.post(message).await.map(|_| ()),
        }?;
        info!(publisher = self.label(), "published message");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    text: &'a str,
}

#[derive(Clone)]
pub struct SlackPublisher {
    client: reqwest::Client,
    url: String,
}

impl SlackPublisher {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub async fn post_text(&self, text: &str) -> Result<(), String> {
        let response = self
            .client
            .post(&self.url)
            .json(&TextPayload { text })
            .send()
            .await
            .map_err(|err| format!("slack request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "failed posting to slack: status {}, content {}",
                status,
                body.trim()
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct XPublisher {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    data: Option<PostedTweet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostedTweet {
    pub id: String,
    pub text: String,
}

impl XPublisher {
    pub fn new(api_base: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            access_token,
        }
    }

    pub async fn post(&self, message: &Message) -> Result<PostedTweet, String> {
        let response = self
            .client
            .post(format!("{}/tweets", self.api_base.trim_end_matches('/')))
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .json(&TextPayload {
                text: message.content(),
            })
            .send()
            .await
            .map_err(|err| format!("X API request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("X API error: {}", status));
            }
            return Err(format!("X API error: {} {}", status, detail));
        }

        let body: PostResponse = response
            .json()
            .await
            .map_err(|err| format!("X API response parse failed: {}", err))?;

        body.data
            .ok_or_else(|| "X API response missing tweet data".to_string())
    }
}

/// Operational channel for run reports. Silent when no webhook is configured.
#[derive(Clone)]
pub struct OpsNotifier {
    slack: Option<SlackPublisher>,
}

impl OpsNotifier {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            slack: config.alerts.slack_url.clone().map(SlackPublisher::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.slack.is_some()
    }

    pub async fn notify(&self, text: &str) -> Result<(), String> {
        match &self.slack {
            Some(slack) => slack.post_text(text).await,
            None => Ok(()),
        }
    }
}
