//! Parsing of raw watch-history export records.
//!
//! The export is an array of per-event JSON objects. Watchable content is
//! recognized by the `/watch?v=` marker in `titleUrl`; post-style records
//! lack it and are skipped as an expected, non-exceptional case.
//!
//! # Error Handling
//!
//! Two channels, never collapsed:
//!
//! - **Expected absence**: a non-watch record makes [`parse_record`] return
//!   `Ok(None)`; missing channel metadata falls back to the sentinel
//!   channel.
//! - **Corruption**: a watch record with missing required fields, malformed
//!   URLs, or an unrecognized title prefix is an [`Error::Parse`] naming
//!   the offending field. The ingestion loop aborts on it rather than
//!   skipping.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{SENTINEL_CHANNEL_ID, SENTINEL_CHANNEL_NAME};

/// URL marker that distinguishes watchable content from other record types.
const WATCH_MARKER: &str = "/watch?v=";

/// UI action prefixes the export prepends to titles.
const TITLE_PREFIXES: [&str; 2] = ["Watched ", "Viewed "];

/// One record of the history export.
///
/// Uses `#[serde(default)]` so deserialization is total; classification and
/// field validation happen in [`parse_record`], not in serde.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub title: Option<String>,
    pub title_url: Option<String>,
    pub subtitles: Vec<RawSubtitle>,
    pub time: Option<String>,
}

/// Channel reference carried in a record's subtitle structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSubtitle {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// A normalized watch record, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedView {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub timestamp: String,
}

/// Whether a record is watchable content (as opposed to a post).
///
/// Pure predicate on the URL shape, no side effects.
pub fn is_watch_record(record: &RawRecord) -> bool {
    record
        .title_url
        .as_deref()
        .map(|url| url.contains(WATCH_MARKER))
        .unwrap_or(false)
}

/// Strip the UI action prefix from a raw title.
///
/// Every content record carries one of the known prefixes; anything else
/// means the export format drifted and is treated as corruption rather than
/// passed through.
pub fn clean_title(raw_title: &str) -> Result<&str> {
    for prefix in TITLE_PREFIXES {
        if let Some(stripped) = raw_title.strip_prefix(prefix) {
            return Ok(stripped);
        }
    }

    Err(Error::Parse {
        field: "title",
        message: format!("unrecognized action prefix: {:?}", raw_title),
    })
}

/// Extract the video id from a watch URL's query string.
///
/// Example: `https://www.youtube.com/watch?v=dQw4w9WgXcQ` -> `dQw4w9WgXcQ`
///
/// Fails unless exactly one non-empty `v` parameter is present.
pub fn extract_video_id(url: &str) -> Result<String> {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };

    if !path.contains("/watch") {
        return Err(Error::Parse {
            field: "titleUrl",
            message: format!("not a watch URL: {}", url),
        });
    }

    // Empty values are dropped before counting
    let ids: Vec<&str> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, value)| *key == "v" && !value.is_empty())
        .map(|(_, value)| value)
        .collect();

    if ids.len() != 1 {
        return Err(Error::Parse {
            field: "titleUrl",
            message: format!(
                "expected exactly one video id, found {}: {}",
                ids.len(),
                url
            ),
        });
    }

    Ok(ids[0].to_string())
}

/// Extract the channel id from a channel URL path.
///
/// Example: `https://www.youtube.com/channel/UCXuqSBlHAE6Xw-yeJA0Tunw`
/// -> `UCXuqSBlHAE6Xw-yeJA0Tunw`
///
/// Fails when the path has no `/channel/<id>` segment or the id is empty.
pub fn extract_channel_id(url: &str) -> Result<String> {
    let path = url.split_once('?').map(|(path, _)| path).unwrap_or(url);

    let mut segments = path.split('/');
    while let Some(segment) = segments.next() {
        if segment == "channel" {
            return match segments.next() {
                Some(id) if !id.is_empty() => Ok(id.to_string()),
                _ => Err(Error::Parse {
                    field: "subtitles",
                    message: format!("channel id not found in URL: {}", url),
                }),
            };
        }
    }

    Err(Error::Parse {
        field: "subtitles",
        message: format!("not a channel URL: {}", url),
    })
}

/// Parse one history record.
///
/// Returns `Ok(None)` for non-watch records (posts and other content
/// types). Returns a normalized [`ParsedView`] for watch records, with the
/// sentinel channel substituted when the record carries no usable channel
/// metadata. Errors only on genuinely malformed watch records.
pub fn parse_record(record: &RawRecord) -> Result<Option<ParsedView>> {
    if !is_watch_record(record) {
        return Ok(None);
    }

    let title_url = record
        .title_url
        .as_deref()
        .ok_or_else(|| missing_field("titleUrl"))?;
    let video_id = extract_video_id(title_url)?;

    let raw_title = record
        .title
        .as_deref()
        .ok_or_else(|| missing_field("title"))?;
    let title = clean_title(raw_title)?.to_string();

    // Sentinel pair unless the subtitle carries both a channel URL and name
    let (channel_id, channel_name) = match record.subtitles.first() {
        Some(RawSubtitle {
            url: Some(url),
            name: Some(name),
        }) => (extract_channel_id(url)?, name.clone()),
        _ => (
            SENTINEL_CHANNEL_ID.to_string(),
            SENTINEL_CHANNEL_NAME.to_string(),
        ),
    };

    let timestamp = record
        .time
        .clone()
        .ok_or_else(|| missing_field("time"))?;

    Ok(Some(ParsedView {
        video_id,
        title,
        channel_id,
        channel_name,
        timestamp,
    }))
}

fn missing_field(field: &'static str) -> Error {
    Error::Parse {
        field,
        message: "required field missing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_is_watch_record() {
        let video = record(json!({
            "title": "Watched Some Video",
            "titleUrl": "https://www.youtube.com/watch?v=abc123"
        }));
        assert!(is_watch_record(&video));

        let post = record(json!({
            "title": "Viewed a community post",
            "titleUrl": "https://www.youtube.com/post/xyz789"
        }));
        assert!(!is_watch_record(&post));

        assert!(!is_watch_record(&RawRecord::default()));
    }

    #[test]
    fn test_clean_title_strips_known_prefixes() {
        assert_eq!(clean_title("Watched My Video").unwrap(), "My Video");
        assert_eq!(clean_title("Viewed My Post").unwrap(), "My Post");
    }

    #[test]
    fn test_clean_title_rejects_unknown_prefix() {
        let err = clean_title("Listened to a song").unwrap_err();
        assert!(matches!(err, Error::Parse { field: "title", .. }));
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc&t=42s").unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_extract_video_id_rejects_malformed() {
        // Not a watch URL
        assert!(extract_video_id("https://www.youtube.com/post/abc").is_err());
        // No id
        assert!(extract_video_id("https://www.youtube.com/watch").is_err());
        // Empty id
        assert!(extract_video_id("https://www.youtube.com/watch?v=").is_err());
        // Ambiguous
        assert!(extract_video_id("https://www.youtube.com/watch?v=a&v=b").is_err());
    }

    #[test]
    fn test_extract_channel_id() {
        assert_eq!(
            extract_channel_id("https://www.youtube.com/channel/UCXuqSBlHAE6Xw-yeJA0Tunw")
                .unwrap(),
            "UCXuqSBlHAE6Xw-yeJA0Tunw"
        );
    }

    #[test]
    fn test_extract_channel_id_rejects_malformed() {
        assert!(extract_channel_id("https://www.youtube.com/user/somebody").is_err());
        assert!(extract_channel_id("https://www.youtube.com/channel/").is_err());
        assert!(extract_channel_id("https://www.youtube.com/channel").is_err());
    }

    #[test]
    fn test_parse_record_watch() {
        let parsed = parse_record(&record(json!({
            "title": "Watched Rust in 100 Seconds",
            "titleUrl": "https://www.youtube.com/watch?v=5C_HPTJg5ek",
            "subtitles": [{
                "name": "Fireship",
                "url": "https://www.youtube.com/channel/UCsBjURrPoezykLs9EqgamOA"
            }],
            "time": "2024-03-15T18:23:45Z"
        })))
        .unwrap()
        .unwrap();

        assert_eq!(parsed.video_id, "5C_HPTJg5ek");
        assert_eq!(parsed.title, "Rust in 100 Seconds");
        assert_eq!(parsed.channel_id, "UCsBjURrPoezykLs9EqgamOA");
        assert_eq!(parsed.channel_name, "Fireship");
        assert_eq!(parsed.timestamp, "2024-03-15T18:23:45Z");
    }

    #[test]
    fn test_parse_record_post_is_none() {
        let result = parse_record(&record(json!({
            "title": "Viewed a community post",
            "titleUrl": "https://www.youtube.com/post/xyz789",
            "time": "2024-03-15T18:23:45Z"
        })))
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_record_missing_channel_uses_sentinel() {
        let parsed = parse_record(&record(json!({
            "title": "Watched https://www.youtube.com/watch?v=gone123",
            "titleUrl": "https://www.youtube.com/watch?v=gone123",
            "time": "2024-03-15T18:23:45Z"
        })))
        .unwrap()
        .unwrap();

        assert_eq!(parsed.channel_id, SENTINEL_CHANNEL_ID);
        assert_eq!(parsed.channel_name, SENTINEL_CHANNEL_NAME);
    }

    #[test]
    fn test_parse_record_partial_subtitle_uses_sentinel() {
        // Name without URL is not usable channel metadata
        let parsed = parse_record(&record(json!({
            "title": "Watched Half Metadata",
            "titleUrl": "https://www.youtube.com/watch?v=half1",
            "subtitles": [{ "name": "Some Channel" }],
            "time": "2024-03-15T18:23:45Z"
        })))
        .unwrap()
        .unwrap();

        assert_eq!(parsed.channel_id, SENTINEL_CHANNEL_ID);
    }

    #[test]
    fn test_parse_record_missing_required_fields() {
        let no_title = record(json!({
            "titleUrl": "https://www.youtube.com/watch?v=abc",
            "time": "2024-03-15T18:23:45Z"
        }));
        assert!(matches!(
            parse_record(&no_title),
            Err(Error::Parse { field: "title", .. })
        ));

        let no_time = record(json!({
            "title": "Watched Something",
            "titleUrl": "https://www.youtube.com/watch?v=abc"
        }));
        assert!(matches!(
            parse_record(&no_time),
            Err(Error::Parse { field: "time", .. })
        ));
    }

    #[test]
    fn test_parse_record_malformed_channel_url_is_error() {
        let bad_channel = record(json!({
            "title": "Watched Something",
            "titleUrl": "https://www.youtube.com/watch?v=abc",
            "subtitles": [{
                "name": "Broken",
                "url": "https://www.youtube.com/channel/"
            }],
            "time": "2024-03-15T18:23:45Z"
        }));
        assert!(parse_record(&bad_channel).is_err());
    }
}
