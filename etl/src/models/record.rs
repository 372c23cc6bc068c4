use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct SourceRecord {
    #[serde(default)]
    pub data: Option<PostData>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PostData {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub reply_settings: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PublicMetrics {
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub retweet_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
}
