//! Weekly digest construction.
//!
//! Turning a flat list of edits into a digest happens in two stages:
//!
//! 1. [`build_report`] sorts the edits newest first, splits them into one
//!    [`DateSection`] per UTC calendar day, and folds runs of consecutive edits
//!    by the same user to the same page into an [`EditGroup`].
//! 2. [`Report::render_html`] turns that structure into the email body.
//!
//! Grouping is a single left-to-right pass over the sorted edits. A group never
//! crosses a day boundary, even when the same user keeps editing the same page
//! across midnight.

mod render;

use crate::types::{EditRecord, ReportWindow};
use chrono::NaiveDate;

pub use render::email_subject;

/// Consecutive edits by one user to one page within a single day
///
/// Always holds at least one edit. Edits are newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditGroup {
    edits: Vec<EditRecord>,
}

impl EditGroup {
    fn new(first: EditRecord) -> Self {
        Self { edits: vec![first] }
    }

    /// Whether `record` continues this group's run
    fn accepts(&self, record: &EditRecord) -> bool {
        self.user() == record.user && self.title() == record.title
    }

    fn push(&mut self, record: EditRecord) {
        self.edits.push(record);
    }

    /// Edits in the group, newest first
    pub fn edits(&self) -> &[EditRecord] {
        &self.edits
    }

    /// Editor shared by every edit in the group
    pub fn user(&self) -> &str {
        &self.latest().user
    }

    /// Page shared by every edit in the group
    pub fn title(&self) -> &str {
        &self.latest().title
    }

    /// Most recent edit
    pub fn latest(&self) -> &EditRecord {
        &self.edits[0]
    }

    /// Oldest edit
    pub fn earliest(&self) -> &EditRecord {
        &self.edits[self.edits.len() - 1]
    }

    /// Number of edits in the group
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Always false; present for API symmetry with [`len`](Self::len)
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// All groups that fall on one UTC calendar day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateSection {
    /// The day, in UTC
    pub date: NaiveDate,

    /// Groups in report order (newest first)
    pub groups: Vec<EditGroup>,
}

impl DateSection {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            groups: Vec::new(),
        }
    }

    /// English weekday name, e.g. "Tuesday"
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    /// Number of edits across all groups in the section
    pub fn edit_count(&self) -> usize {
        self.groups.iter().map(EditGroup::len).sum()
    }
}

/// A grouped, date-sectioned digest ready to render
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// Short wiki name shown in the heading
    pub title: String,

    /// Period the report covers
    pub window: ReportWindow,

    /// Days in report order (newest first)
    pub sections: Vec<DateSection>,
}

impl Report {
    /// True when there is nothing to report
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of edits in the report
    pub fn edit_count(&self) -> usize {
        self.sections.iter().map(DateSection::edit_count).sum()
    }

    /// All edits in report order, flattened back out of sections and groups
    pub fn records(&self) -> impl Iterator<Item = &EditRecord> {
        self.sections
            .iter()
            .flat_map(|s| s.groups.iter())
            .flat_map(|g| g.edits().iter())
    }
}

/// Sort, section, and group edits into a [`Report`]
///
/// Edits are ordered newest first; edits with identical timestamps keep their
/// input order.
pub fn build_report(
    mut records: Vec<EditRecord>,
    title: impl Into<String>,
    window: ReportWindow,
) -> Report {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut grouper = Grouper::default();
    for record in records {
        grouper.push(record);
    }

    Report {
        title: title.into(),
        window,
        sections: grouper.finish(),
    }
}

/// Build and render in one step
///
/// Returns `None` when `records` is empty: an empty week produces no digest.
pub fn format_changes(
    records: Vec<EditRecord>,
    base_url: &str,
    window: ReportWindow,
    title: &str,
) -> Option<String> {
    let report = build_report(records, title, window);
    if report.is_empty() {
        return None;
    }
    Some(report.render_html(base_url))
}

/// Running state of the single grouping pass
#[derive(Default)]
struct Grouper {
    done: Vec<DateSection>,
    section: Option<DateSection>,
    group: Option<EditGroup>,
}

impl Grouper {
    fn push(&mut self, record: EditRecord) {
        let date = record.date();
        if self.section.as_ref().map(|s| s.date) != Some(date) {
            self.close_section();
            self.section = Some(DateSection::new(date));
        }

        match self.group.as_mut() {
            Some(group) if group.accepts(&record) => group.push(record),
            _ => {
                self.close_group();
                self.group = Some(EditGroup::new(record));
            }
        }
    }

    fn close_group(&mut self) {
        if let (Some(group), Some(section)) = (self.group.take(), self.section.as_mut()) {
            section.groups.push(group);
        }
    }

    fn close_section(&mut self) {
        self.close_group();
        if let Some(section) = self.section.take() {
            self.done.push(section);
        }
    }

    fn finish(mut self) -> Vec<DateSection> {
        self.close_section();
        self.done
    }
}
