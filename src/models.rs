use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The daily judgment, stored as its numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Choice {
    Up,
    Same,
    Down,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Up, Choice::Same, Choice::Down];

    pub fn value(self) -> i8 {
        match self {
            Choice::Up => 1,
            Choice::Same => 0,
            Choice::Down => -1,
        }
    }

    /// Name used in HTML forms.
    pub fn slug(self) -> &'static str {
        match self {
            Choice::Up => "up",
            Choice::Same => "same",
            Choice::Down => "down",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.slug() == slug)
    }
}

impl TryFrom<i8> for Choice {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Choice::Up),
            0 => Ok(Choice::Same),
            -1 => Ok(Choice::Down),
            other => Err(format!("choice must be -1, 0 or 1, got {other}")),
        }
    }
}

impl From<Choice> for i8 {
    fn from(choice: Choice) -> Self {
        choice.value()
    }
}

/// One day's judgment. `day_key` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    #[serde(rename = "id")]
    pub day_key: String,
    pub created_at: DateTime<Utc>,
    pub choice: Choice,
    pub caption: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveEntryRequest {
    pub choice: Choice,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveEntryForm {
    pub choice: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct IndexQuery {
    #[serde(default)]
    pub saved: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendResponse {
    pub points: Vec<TrendPoint>,
    pub y_domain: (i64, i64),
}
