use crate::models::{MISSING_TEXT, NormalizedRow, SourceRecord};
use common::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct RecordExtractor;

impl RecordExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, line: &str) -> Result<NormalizedRow> {
        let record: SourceRecord = serde_json::from_str(line).map_err(Error::Parse)?;
        Ok(Self::normalize(record))
    }

    pub fn extract_bytes(&self, line: &[u8]) -> Result<NormalizedRow> {
        let line = std::str::from_utf8(line)?;
        self.extract(line)
    }

    fn normalize(record: SourceRecord) -> NormalizedRow {
        let data = record.data.unwrap_or_default();
        let metrics = data.public_metrics.unwrap_or_default();

        NormalizedRow {
            likes: metrics.like_count.unwrap_or(0),
            retweets: metrics.retweet_count.unwrap_or(0),
            text: text_or_missing(data.text),
            replies: metrics.reply_count.unwrap_or(0),
            created_at: text_or_missing(data.created_at),
            reply_settings: text_or_missing(data.reply_settings),
        }
    }
}

fn text_or_missing(value: Option<String>) -> String {
    match value {
        Some(text) => strip_line_breaks(&text),
        None => MISSING_TEXT.to_string(),
    }
}

/// Replaces every `\r\n`, `\r` or `\n` with a single space.
pub fn strip_line_breaks(text: &str) -> String {
    if !text.contains(['\r', '\n']) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{"data":{"text":"gm everyone","public_metrics":{"like_count":12,"retweet_count":3,"reply_count":4,"quote_count":1},"created_at":"2023-01-01T00:00:01.000Z","reply_settings":"everyone","lang":"en"},"matching_rules":[{"id":"1"}]}"#;

    #[test]
    fn test_full_record() {
        let row = RecordExtractor::new().extract(FULL).unwrap();
        assert_eq!(
            row,
            NormalizedRow {
                likes: 12,
                retweets: 3,
                text: "gm everyone".to_string(),
                replies: 4,
                created_at: "2023-01-01T00:00:01.000Z".to_string(),
                reply_settings: "everyone".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_public_metrics_defaults_to_zero() {
        let row = RecordExtractor::new()
            .extract(r#"{"data":{"text":"no metrics"}}"#)
            .unwrap();
        assert_eq!((row.likes, row.retweets, row.replies), (0, 0, 0));
        assert_eq!(row.created_at, MISSING_TEXT);
        assert_eq!(row.reply_settings, MISSING_TEXT);
    }

    #[test]
    fn test_missing_data_object() {
        let row = RecordExtractor::new().extract(r#"{"includes":{}}"#).unwrap();
        assert_eq!(row.text, MISSING_TEXT);
        assert_eq!(row.likes, 0);
    }

    #[test]
    fn test_partial_metrics_and_nulls() {
        let row = RecordExtractor::new()
            .extract(r#"{"data":{"text":null,"public_metrics":{"like_count":9,"reply_count":null}}}"#)
            .unwrap();
        assert_eq!(row.likes, 9);
        assert_eq!(row.retweets, 0);
        assert_eq!(row.replies, 0);
        assert_eq!(row.text, MISSING_TEXT);
    }

    #[test]
    fn test_line_breaks_in_text() {
        let row = RecordExtractor::new()
            .extract(r#"{"data":{"text":"one\ntwo\r\nthree\rfour"}}"#)
            .unwrap();
        assert_eq!(row.text, "one two three four");
    }

    #[test]
    fn test_malformed_lines() {
        let extractor = RecordExtractor::new();
        for line in ["", "{\"data\":", "not json", "null", r#"{"data":{"public_metrics":{"like_count":"many"}}}"#] {
            let err = extractor.extract(line).unwrap_err();
            assert!(matches!(err, Error::Parse(_)), "line {:?} gave {:?}", line, err);
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = vec![b'{', 0xff, b'}'];
        let err = RecordExtractor::new().extract_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_trailing_newline_is_tolerated() {
        let line = format!("{}\r\n", FULL);
        assert!(RecordExtractor::new().extract(&line).is_ok());
    }
}
