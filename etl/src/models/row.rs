use common::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub const MISSING_TEXT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub likes: u64,
    pub retweets: u64,
    pub text: String,
    pub replies: u64,
    pub created_at: String,
    pub reply_settings: String,
}

impl NormalizedRow {
    pub fn value(&self, column: Column) -> String {
        match column {
            Column::Likes => self.likes.to_string(),
            Column::Retweets => self.retweets.to_string(),
            Column::Text => self.text.clone(),
            Column::Replies => self.replies.to_string(),
            Column::CreatedAt => self.created_at.clone(),
            Column::ReplySettings => self.reply_settings.clone(),
        }
    }

    pub fn record(&self, layout: &ColumnLayout) -> Vec<String> {
        layout.columns().iter().map(|c| self.value(*c)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Likes,
    Retweets,
    Text,
    Replies,
    CreatedAt,
    ReplySettings,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Likes,
        Column::Retweets,
        Column::Text,
        Column::Replies,
        Column::CreatedAt,
        Column::ReplySettings,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Likes => "Likes",
            Column::Retweets => "Retweets",
            Column::Text => "text",
            Column::Replies => "Replies",
            Column::CreatedAt => "Created At",
            Column::ReplySettings => "Reply Settings",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = Error;

    /// Accepts either the config key (`created_at`) or the header label (`Created At`).
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "likes" | "like_count" => Ok(Column::Likes),
            "retweets" | "retweet_count" => Ok(Column::Retweets),
            "text" => Ok(Column::Text),
            "replies" | "reply_count" => Ok(Column::Replies),
            "created_at" => Ok(Column::CreatedAt),
            "reply_settings" => Ok(Column::ReplySettings),
            _ => Err(Error::InvalidInput(format!("Unknown column '{}'", s))),
        }
    }
}

/// Column order of the output table. Always a permutation of [`Column::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.len() != Column::ALL.len() {
            return Err(Error::InvalidInput(format!(
                "Column layout needs all {} columns, got {}",
                Column::ALL.len(),
                columns.len()
            )));
        }
        for column in Column::ALL {
            if !columns.contains(&column) {
                return Err(Error::InvalidInput(format!(
                    "Column layout is missing '{}'",
                    column
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn text_first() -> Self {
        Self {
            columns: vec![
                Column::Text,
                Column::Likes,
                Column::Retweets,
                Column::Replies,
                Column::CreatedAt,
                Column::ReplySettings,
            ],
        }
    }

    /// Resolves a preset name (`default`, `text-first`) or an explicit list of columns.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if let [single] = names {
            match single.as_ref().trim() {
                "default" => return Ok(Self::default()),
                "text-first" | "text_first" => return Ok(Self::text_first()),
                _ => {}
            }
        }

        let columns = names
            .iter()
            .map(|name| name.as_ref().parse::<Column>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
        }
    }
}
