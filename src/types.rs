//! Core types for rc-digest

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Wiki revision identifier
///
/// `0` stands for "no previous revision" (page creations).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RevisionId(pub u64);

impl PartialEq<u64> for RevisionId {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the recent changes feed
///
/// Deserializes directly from a `list=recentchanges` item; fields the report
/// does not use (`ns`, `pageid`, `rcid`, `type`) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Page title, with spaces (e.g. "Main Page")
    pub title: String,

    /// When the edit was saved (UTC, second precision)
    pub timestamp: DateTime<Utc>,

    /// Editor's user name; empty when the wiki hides it
    #[serde(default)]
    pub user: String,

    /// Edit summary; empty when none was given or it was suppressed
    #[serde(default)]
    pub comment: String,

    /// Revision created by this edit
    #[serde(rename = "revid")]
    pub revision_id: RevisionId,

    /// Revision this edit was based on (0 for page creations)
    #[serde(rename = "old_revid", default)]
    pub previous_revision_id: RevisionId,
}

impl EditRecord {
    /// Calendar date of the edit in UTC
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// The time span a report covers
///
/// `start` is the chronologically earlier instant. The recent changes API pages
/// backwards in time, so queries use [`newer_bound`](Self::newer_bound) as
/// `rcstart` and [`older_bound`](Self::older_bound) as `rcend`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportWindow {
    /// First instant of the window (Sunday 00:00:00 UTC)
    pub start: DateTime<Utc>,

    /// Last instant of the window (Saturday 23:59:59 UTC)
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// The later instant, where a backwards walk begins
    pub fn newer_bound(&self) -> DateTime<Utc> {
        self.end
    }

    /// The earlier instant, where a backwards walk stops
    pub fn older_bound(&self) -> DateTime<Utc> {
        self.start
    }
}
