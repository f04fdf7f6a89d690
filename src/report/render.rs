//! HTML rendering for [`Report`].
//!
//! All wiki-supplied text (titles, user names, comments) goes through
//! [`escape_html`]; all link targets are percent-encoded and then escaped for
//! use inside single-quoted attributes.

use super::{DateSection, EditGroup, Report};
use crate::types::{EditRecord, ReportWindow};
use crate::utils::{encode_path, encode_title, escape_html};

/// Month-and-day format used in headings and subjects, e.g. "Jan 07"
const SHORT_DATE_FORMAT: &str = "%b %d";

/// Time-of-day format for edits, e.g. "09:30"
const TIME_FORMAT: &str = "%H:%M";

impl Report {
    /// Render the digest as an HTML fragment
    ///
    /// Output is deterministic: the same report always renders to the same
    /// bytes. Lines are separated by `\n`.
    pub fn render_html(&self, base_url: &str) -> String {
        let base_url = base_url.trim_end_matches('/');
        let title = escape_html(&self.title);

        let mut lines = vec![
            format!(
                "<h1>Weekly {} report: {}</h1>",
                title,
                date_range(&self.window)
            ),
            format!("<p>Here are the recent changes on {title} for the past week:</p>"),
        ];

        for section in &self.sections {
            render_section(&mut lines, section, base_url);
        }

        lines.join("\n")
    }
}

/// Subject line for the digest email
///
/// Uses the full wiki domain, e.g. `Weekly wiki.example.org report: Jan 07 - Jan 13`.
pub fn email_subject(domain: &str, window: &ReportWindow) -> String {
    format!("Weekly {} report: {}", domain, date_range(window))
}

fn date_range(window: &ReportWindow) -> String {
    format!(
        "{} - {}",
        window.start.format(SHORT_DATE_FORMAT),
        window.end.format(SHORT_DATE_FORMAT)
    )
}

fn render_section(lines: &mut Vec<String>, section: &DateSection, base_url: &str) {
    lines.push(format!(
        "<h2>{} ({})</h2>",
        section.date.format("%Y-%m-%d"),
        section.weekday_name()
    ));
    for group in &section.groups {
        render_group(lines, group, base_url);
    }
}

fn render_group(lines: &mut Vec<String>, group: &EditGroup, base_url: &str) {
    // Newest edit is first, so the range runs from the last edit to the first
    let time_range = format!(
        "[{} - {}]",
        group.earliest().timestamp.format(TIME_FORMAT),
        group.latest().timestamp.format(TIME_FORMAT)
    );
    let page_url = format!("{}/wiki/{}", base_url, encode_title(group.title()));
    let user_url = format!("{}/wiki/User:{}", base_url, encode_path(group.user()));

    lines.push(format!(
        "<p><strong>{} <a href='{}'><strong>{}</strong></a> [<a href='{}'>{}</a>]</strong></p>",
        time_range,
        escape_html(&page_url),
        escape_html(group.title()),
        escape_html(&user_url),
        escape_html(group.user())
    ));

    lines.push("<ul>".to_string());
    for edit in group.edits() {
        lines.push(render_edit(edit, base_url));
    }
    lines.push("</ul>".to_string());
}

fn render_edit(edit: &EditRecord, base_url: &str) -> String {
    let diff_url = format!(
        "{}/w/index.php?diff={}&oldid={}",
        base_url, edit.revision_id, edit.previous_revision_id
    );
    format!(
        "<li>[<a href='{}'>diff</a>] [{}] ('{}') </li>",
        escape_html(&diff_url),
        edit.timestamp.format(TIME_FORMAT),
        escape_html(&edit.comment)
    )
}
