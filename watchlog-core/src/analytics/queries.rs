//! Aggregate queries over the history store.

use chrono::DateTime;
use rusqlite::{params, Connection};

use super::series::{merge_month_series, month_span, YearMonth};
use super::{ChannelStats, DatasetOverview, MonthlyCount, VideoView, YearSummary};
use crate::db::Store;
use crate::error::{Error, Result};
use crate::types::SENTINEL_CHANNEL_ID;

/// Filter scope for the shared rewatch metric.
///
/// A rewatch is a video with two or more view events; the count is the
/// number of such distinct videos, not the number of extra views. Every
/// rewatch-bearing query goes through [`count_rewatched_videos`] so the
/// definition cannot drift between call sites.
#[derive(Debug, Clone, Copy)]
enum RewatchScope<'a> {
    Global,
    Channel(&'a str),
    Year(i32),
    ChannelYear(&'a str, i32),
}

fn count_rewatched_videos(conn: &Connection, scope: RewatchScope) -> rusqlite::Result<i64> {
    const HEAD: &str = "SELECT COUNT(*) FROM (SELECT video_id FROM views";
    const TAIL: &str = " GROUP BY video_id HAVING COUNT(*) >= 2)";

    match scope {
        RewatchScope::Global => conn.query_row(&format!("{HEAD}{TAIL}"), [], |r| r.get(0)),
        RewatchScope::Channel(channel_id) => conn.query_row(
            &format!("{HEAD} WHERE channel_id = ?1{TAIL}"),
            params![channel_id],
            |r| r.get(0),
        ),
        RewatchScope::Year(year) => conn.query_row(
            &format!("{HEAD} WHERE strftime('%Y', timestamp) = ?1{TAIL}"),
            params![year_key(year)],
            |r| r.get(0),
        ),
        RewatchScope::ChannelYear(channel_id, year) => conn.query_row(
            &format!("{HEAD} WHERE channel_id = ?1 AND strftime('%Y', timestamp) = ?2{TAIL}"),
            params![channel_id, year_key(year)],
            |r| r.get(0),
        ),
    }
}

/// Year formatted the way `strftime('%Y', ...)` produces it, so filters hit
/// the year expression index.
fn year_key(year: i32) -> String {
    format!("{:04}", year)
}

/// Truncate an ISO-8601 timestamp to `YYYY-MM-DD`.
fn day_of(ts: &str) -> String {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| ts.chars().take(10).collect())
}

/// Truncate an ISO-8601 timestamp to `YYYY-MM`.
fn month_of(ts: &str) -> String {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_else(|_| ts.chars().take(7).collect())
}

/// High-level dataset statistics.
///
/// Always covers every view event, including those attributed to the
/// sentinel channel; nothing is silently excluded. An empty store yields
/// zero counts and `None` dates rather than an error.
pub fn dataset_overview(store: &Store) -> Result<DatasetOverview> {
    tracing::debug!("dataset_overview");
    let conn = store.connection();

    let (first, last, total_views, unique_videos, unique_channels) = conn
        .query_row(
            r#"
            SELECT
                MIN(timestamp),
                MAX(timestamp),
                COUNT(*),
                COUNT(DISTINCT video_id),
                COUNT(DISTINCT channel_id)
            FROM views
            "#,
            [],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )
        .map_err(|e| {
            tracing::error!(error = %e, "overview query failed");
            Error::from(e)
        })?;

    let total_rewatch_count = count_rewatched_videos(&conn, RewatchScope::Global)?;

    Ok(DatasetOverview {
        first_view: first.as_deref().map(day_of),
        last_view: last.as_deref().map(day_of),
        total_views,
        unique_videos,
        unique_channels,
        total_rewatch_count,
    })
}

/// Top channels ranked by total view count, descending.
///
/// Ties break on `channel_id` ascending so rankings are deterministic. The
/// sentinel channel is excluded unless `include_sentinel` is set. A
/// non-positive `limit` yields an empty list; an oversized one returns as
/// many rows as exist.
pub fn top_channels(store: &Store, limit: i64, include_sentinel: bool) -> Result<Vec<ChannelStats>> {
    tracing::debug!(limit, include_sentinel, "top_channels");
    ranked_channels(store, None, limit, include_sentinel)
}

/// Top channels within a single calendar year. Same shape and ordering as
/// [`top_channels`].
pub fn top_channels_for_year(
    store: &Store,
    year: i32,
    limit: i64,
    include_sentinel: bool,
) -> Result<Vec<ChannelStats>> {
    tracing::debug!(year, limit, include_sentinel, "top_channels_for_year");
    ranked_channels(store, Some(year), limit, include_sentinel)
}

type ChannelRow = (String, String, i64, i64, Option<String>, Option<String>);

fn map_channel_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChannelRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn ranked_channels(
    store: &Store,
    year: Option<i32>,
    limit: i64,
    include_sentinel: bool,
) -> Result<Vec<ChannelStats>> {
    let conn = store.connection();
    let limit = limit.max(0);

    let year_filter = match year {
        Some(_) => "AND strftime('%Y', v.timestamp) = ?4",
        None => "",
    };
    let sql = format!(
        r#"
        SELECT
            c.channel_id,
            c.channel_name,
            COUNT(*) AS total_views,
            COUNT(DISTINCT v.video_id) AS unique_videos,
            MIN(v.timestamp) AS first_view,
            MAX(v.timestamp) AS last_view
        FROM views v
        JOIN channels c ON v.channel_id = c.channel_id
        WHERE (?1 = 1 OR c.channel_id != ?2)
          {year_filter}
        GROUP BY c.channel_id, c.channel_name
        ORDER BY total_views DESC, c.channel_id ASC
        LIMIT ?3
        "#
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<ChannelRow> = match year {
        Some(year) => stmt
            .query_map(
                params![include_sentinel, SENTINEL_CHANNEL_ID, limit, year_key(year)],
                map_channel_row,
            )?
            .collect::<rusqlite::Result<_>>(),
        None => stmt
            .query_map(
                params![include_sentinel, SENTINEL_CHANNEL_ID, limit],
                map_channel_row,
            )?
            .collect::<rusqlite::Result<_>>(),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "channel ranking query failed");
        Error::from(e)
    })?;

    let mut channels = Vec::with_capacity(rows.len());
    for (channel_id, channel_name, total_views, unique_videos, first, last) in rows {
        let scope = match year {
            Some(year) => RewatchScope::ChannelYear(&channel_id, year),
            None => RewatchScope::Channel(&channel_id),
        };
        let rewatch_count = count_rewatched_videos(&conn, scope).map_err(|e| {
            tracing::error!(error = %e, channel_id = %channel_id, "rewatch count query failed");
            Error::from(e)
        })?;

        channels.push(ChannelStats {
            channel_id,
            channel_name,
            total_views,
            unique_videos,
            first_view: first.as_deref().map(month_of),
            last_view: last.as_deref().map(month_of),
            rewatch_count,
        });
    }

    Ok(channels)
}

/// One summary entry per calendar year in the dataset's span, oldest first.
///
/// Years with no recorded activity still appear, zeroed: the range comes
/// from the dataset's global min/max timestamps, not from the years that
/// happen to have rows.
pub fn per_year_summary(store: &Store) -> Result<Vec<YearSummary>> {
    tracing::debug!("per_year_summary");

    let Some((min_year, max_year)) = dataset_year_range(store)? else {
        return Ok(Vec::new());
    };

    let conn = store.connection();
    let mut stmt = conn.prepare(
        r#"
        SELECT
            COUNT(*),
            COUNT(DISTINCT video_id),
            COUNT(DISTINCT channel_id),
            MIN(timestamp),
            MAX(timestamp)
        FROM views
        WHERE strftime('%Y', timestamp) = ?1
        "#,
    )?;

    let mut summaries = Vec::with_capacity((max_year - min_year + 1) as usize);
    for year in min_year..=max_year {
        let (total_views, unique_videos, unique_channels, first, last) = stmt
            .query_row(params![year_key(year)], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| {
                tracing::error!(error = %e, year, "year summary query failed");
                Error::from(e)
            })?;

        let rewatch_count = count_rewatched_videos(&conn, RewatchScope::Year(year))?;

        summaries.push(YearSummary {
            year,
            total_views,
            unique_videos,
            unique_channels,
            rewatch_count,
            first_view: first.as_deref().map(day_of),
            last_view: last.as_deref().map(day_of),
        });
    }

    Ok(summaries)
}

/// Gap-filled per-month view counts, most recent month first.
///
/// The full month range is generated independently of the data and merged
/// against the grouped query, so months without views appear with a zero
/// count.
pub fn monthly_view_counts(store: &Store) -> Result<Vec<MonthlyCount>> {
    tracing::debug!("monthly_view_counts");
    let conn = store.connection();

    let bounds = conn
        .query_row(
            "SELECT strftime('%Y-%m', MIN(timestamp)), strftime('%Y-%m', MAX(timestamp)) FROM views",
            [],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                ))
            },
        )
        .map_err(|e| {
            tracing::error!(error = %e, "month bounds query failed");
            Error::from(e)
        })?;

    let (Some(first), Some(last)) = bounds else {
        return Ok(Vec::new());
    };
    let first = parse_month_key(&first)?;
    let last = parse_month_key(&last)?;

    let mut stmt = conn.prepare(
        r#"
        SELECT strftime('%Y-%m', timestamp) AS month, COUNT(*) AS cnt
        FROM views
        GROUP BY month
        ORDER BY month ASC
        "#,
    )?;
    let counted: Vec<(YearMonth, i64)> = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| {
            tracing::error!(error = %e, "monthly counts query failed");
            Error::from(e)
        })?
        .into_iter()
        .map(|(month, count)| Ok((parse_month_key(&month)?, count)))
        .collect::<Result<_>>()?;

    let merged = merge_month_series(&month_span(first, last), &counted);

    Ok(merged
        .into_iter()
        .rev()
        .map(|(month, count)| MonthlyCount {
            month: month.to_string(),
            count,
        })
        .collect())
}

/// Chronologically ordered view events within one calendar month.
///
/// An out-of-range month is a caller error, distinct from a month with no
/// data (which yields an empty list).
pub fn videos_for_month(store: &Store, year: i32, month: u32) -> Result<Vec<VideoView>> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidMonth(month));
    }
    tracing::debug!(year, month, "videos_for_month");

    let conn = store.connection();
    let month_key = YearMonth { year, month }.to_string();

    let mut stmt = conn.prepare(
        r#"
        SELECT v.timestamp, v.video_id, vd.title, v.channel_id, c.channel_name
        FROM views v
        JOIN videos vd ON v.video_id = vd.video_id
        JOIN channels c ON v.channel_id = c.channel_id
        WHERE strftime('%Y-%m', v.timestamp) = ?1
        ORDER BY v.timestamp ASC
        "#,
    )?;

    let views = stmt
        .query_map([&month_key], |row| {
            Ok(VideoView {
                timestamp: row.get(0)?,
                video_id: row.get(1)?,
                title: row.get(2)?,
                channel_id: row.get(3)?,
                channel_name: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| {
            tracing::error!(error = %e, month = %month_key, "month drill-down query failed");
            Error::from(e)
        });
    views
}

/// Inclusive `(min_year, max_year)` of the dataset, or `None` when empty.
pub fn dataset_year_range(store: &Store) -> Result<Option<(i32, i32)>> {
    let conn = store.connection();

    let (min_year, max_year) = conn
        .query_row(
            "SELECT CAST(strftime('%Y', MIN(timestamp)) AS INTEGER),
                    CAST(strftime('%Y', MAX(timestamp)) AS INTEGER)
             FROM views",
            [],
            |row| {
                Ok((
                    row.get::<_, Option<i32>>(0)?,
                    row.get::<_, Option<i32>>(1)?,
                ))
            },
        )
        .map_err(|e| {
            tracing::error!(error = %e, "year range query failed");
            Error::from(e)
        })?;

    Ok(min_year.zip(max_year))
}

fn parse_month_key(s: &str) -> Result<YearMonth> {
    YearMonth::parse(s).ok_or_else(|| Error::Parse {
        field: "timestamp",
        message: format!("unparseable month key: {:?}", s),
    })
}
