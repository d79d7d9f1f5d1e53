//! Analytics query engine
//!
//! Read-only aggregate queries over the history store. Every function is a
//! pure function of (store, parameters): nothing here mutates the store or
//! keeps state between calls, and results are plain serializable data so no
//! presentation types leak into the core.
//!
//! Query failures are logged and re-raised; whether to intercept them for
//! an interactive debug workflow is strictly the caller's concern.

pub mod queries;
pub mod series;

pub use queries::{
    dataset_overview, dataset_year_range, monthly_view_counts, per_year_summary, top_channels,
    top_channels_for_year, videos_for_month,
};
pub use series::{merge_month_series, month_span, YearMonth};

use serde::Serialize;

/// High-level dataset statistics across every view event, sentinel channel
/// included: this is the ground truth of what the dataset holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    /// First view date (`YYYY-MM-DD`), `None` for an empty store
    pub first_view: Option<String>,
    /// Last view date (`YYYY-MM-DD`), `None` for an empty store
    pub last_view: Option<String>,
    pub total_views: i64,
    pub unique_videos: i64,
    pub unique_channels: i64,
    /// Distinct videos watched two or more times
    pub total_rewatch_count: i64,
}

/// One entry of a channel ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub channel_id: String,
    pub channel_name: String,
    pub total_views: i64,
    pub unique_videos: i64,
    /// First view month (`YYYY-MM`)
    pub first_view: Option<String>,
    /// Last view month (`YYYY-MM`)
    pub last_view: Option<String>,
    /// Distinct videos of this channel watched two or more times
    pub rewatch_count: i64,
}

/// Activity summary for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub total_views: i64,
    pub unique_videos: i64,
    pub unique_channels: i64,
    pub rewatch_count: i64,
    /// First view within the year (`YYYY-MM-DD`)
    pub first_view: Option<String>,
    /// Last view within the year (`YYYY-MM-DD`)
    pub last_view: Option<String>,
}

/// One month of the gap-filled view series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// Calendar month (`YYYY-MM`)
    pub month: String,
    pub count: i64,
}

/// One view event row for month drill-down display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoView {
    pub timestamp: String,
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
}
