//! Paginated `list=recentchanges` query.

use super::{WikiSession, get_json, param_value};
use crate::error::{Error, Result};
use crate::types::EditRecord;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Timestamp format the API expects for `rcstart` / `rcend`
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Properties requested for each change
const RC_PROPS: &str = "title|timestamp|user|comment|ids";

impl WikiSession {
    /// Fetch every change between two instants
    ///
    /// The query walks backwards in time (`rcdir=older`), so `newer_bound` is
    /// sent as `rcstart` and `older_bound` as `rcend`. Pages are requested until
    /// the server stops returning a `continue` object; each continuation's
    /// parameters are merged into the next request.
    ///
    /// Records are returned in fetch order (newest first, as served). Entries
    /// the wiki serves without a title or revision id (suppressed log actions)
    /// are skipped.
    ///
    /// # Errors
    /// Any failing page aborts the whole fetch; partial results are dropped.
    /// - [`Error::Transport`] for network or HTTP status failures
    /// - [`Error::ResponseShape`] for a missing `query.recentchanges` list, an
    ///   undecodable record, or a continuation that does not advance
    pub async fn fetch_recent_changes(
        &self,
        newer_bound: DateTime<Utc>,
        older_bound: DateTime<Utc>,
    ) -> Result<Vec<EditRecord>> {
        let mut params: BTreeMap<String, String> = [
            ("action", "query".to_string()),
            ("list", "recentchanges".to_string()),
            ("rcprop", RC_PROPS.to_string()),
            ("rclimit", "max".to_string()),
            ("rcstart", newer_bound.format(API_TIMESTAMP_FORMAT).to_string()),
            ("rcend", older_bound.format(API_TIMESTAMP_FORMAT).to_string()),
            ("rcdir", "older".to_string()),
            ("format", "json".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mut changes = Vec::new();
        let mut last_continue: Option<BTreeMap<String, String>> = None;
        let mut page = 0usize;

        loop {
            page += 1;
            let data = get_json(
                &self.http_client,
                &self.api_url,
                &params,
                "recent changes query",
            )
            .await?;

            let records = parse_page(&data)?;
            debug!(page, count = records.len(), "Fetched recent changes page");
            changes.extend(records);

            let Some(next) = continuation(&data)? else {
                break;
            };
            if last_continue.as_ref() == Some(&next) {
                return Err(Error::response_shape(
                    "recent changes query",
                    "continuation token did not advance",
                ));
            }
            params.extend(next.clone());
            last_continue = Some(next);
        }

        info!(pages = page, count = changes.len(), "Fetched recent changes");
        Ok(changes)
    }
}

/// Decode the `query.recentchanges` array of one response page
fn parse_page(data: &Value) -> Result<Vec<EditRecord>> {
    let list = data
        .pointer("/query/recentchanges")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::response_shape("recent changes query", "missing `query.recentchanges`")
        })?;

    let mut records = Vec::with_capacity(list.len());
    for item in list {
        if item.get("title").is_none() || item.get("revid").is_none() {
            warn!(
                rc_type = item.get("type").and_then(serde_json::Value::as_str).unwrap_or("unknown"),
                timestamp = item.get("timestamp").and_then(serde_json::Value::as_str).unwrap_or(""),
                "Skipping change without title or revision id"
            );
            continue;
        }
        let record = serde_json::from_value(item.clone())
            .map_err(|e| Error::response_shape("recent changes query", e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Extract the `continue` object as request parameters, if the server sent one
fn continuation(data: &Value) -> Result<Option<BTreeMap<String, String>>> {
    match data.get("continue") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(
            map.iter()
                .map(|(k, v)| (k.clone(), param_value(v)))
                .collect(),
        )),
        Some(other) => Err(Error::response_shape(
            "recent changes query",
            format!("`continue` is not an object: {other}"),
        )),
    }
}
