use chrono::{Duration, NaiveDate};
use std::fmt;

use crate::error::{CounterError, Result};
use crate::events::Event;
use crate::format_number;
use crate::series::CountSeries;

pub const MAX_MESSAGE_LENGTH: usize = 280;

/// Publishable text. Never longer than [`MAX_MESSAGE_LENGTH`] characters;
/// an overlong message is rejected rather than truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    content: String,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        let length = content.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(CounterError::MessageTooLong {
                length,
                max: MAX_MESSAGE_LENGTH,
            });
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hashtag {
    content: String,
}

impl Hashtag {
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if !content.starts_with('#') {
            return Err(CounterError::InvalidHashtag(content));
        }
        Ok(Self { content })
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

pub fn day_expression(day: NaiveDate, publish_day: NaiveDate) -> String {
    if day == publish_day {
        return "Aujourd'hui".to_string();
    }
    if publish_day - Duration::days(1) == day {
        return "Hier".to_string();
    }
    format!("Le {}", day.format("%d/%m/%Y"))
}

pub fn day_sentence(day: NaiveDate, series: &CountSeries, publish_day: NaiveDate) -> Result<String> {
    let count = series.get_count(day)?;
    Ok(format!(
        "{}, il y a eu {} passages de cyclistes.",
        day_expression(day, publish_day),
        format_number(count)
    ))
}

pub fn compose_message(
    day: NaiveDate,
    series: &CountSeries,
    publish_day: NaiveDate,
    event: &Event,
    hashtag: Option<&Hashtag>,
) -> Result<Message> {
    let mut lines = vec![
        day_sentence(day, series, publish_day)?,
        event.default_message()?,
    ];
    if let Some(hashtag) = hashtag {
        lines.push(hashtag.as_str().to_string());
    }
    Message::new(lines.join("\n"))
}
