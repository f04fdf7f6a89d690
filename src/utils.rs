//! Text escaping helpers for building HTML and wiki URLs

/// Escape HTML special characters
///
/// Safe for element text and for attribute values in either quote style.
///
/// # Examples
///
/// ```
/// use rc_digest::utils::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a URL path, leaving `/` separators intact
///
/// Everything except ASCII alphanumerics, `-_.~` and `/` is encoded as UTF-8
/// `%XX` sequences, so subpage titles like `Help/FAQ` keep their slash.
///
/// # Examples
///
/// ```
/// use rc_digest::utils::encode_path;
///
/// assert_eq!(encode_path("Help/FAQ & more"), "Help/FAQ%20%26%20more");
/// ```
#[must_use]
pub fn encode_path(s: &str) -> String {
    s.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Encode a page title the way the wiki spells it in `/wiki/` links
///
/// Spaces become underscores before percent-encoding.
#[must_use]
pub fn encode_title(title: &str) -> String {
    encode_path(&title.replace(' ', "_"))
}
