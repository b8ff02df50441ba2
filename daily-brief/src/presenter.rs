//! Plain-text report output.

use chrono::NaiveDate;
use std::io::{self, Write};

pub const RULE: &str = "===================================";
pub const REPORT_TITLE: &str = "DAILY MARKET BRIEF";
pub const PROMPT_TITLE: &str = "DAILY MARKET BRIEF – PROMPT";

/// Banner followed by the body, verbatim.
pub fn render_report(title: &str, date: NaiveDate, body: &str) -> String {
    format!(
        "{rule}\n{title}\nDATE: {date}\n{rule}\n{body}\n",
        rule = RULE,
        title = title,
        date = date.format("%d %b %Y"),
        body = body,
    )
}

/// Write a rendered report and flush.
pub fn present<W: Write>(out: &mut W, title: &str, date: NaiveDate, body: &str) -> io::Result<()> {
    out.write_all(render_report(title, date, body).as_bytes())?;
    out.flush()
}
