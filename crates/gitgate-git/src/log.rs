//! Commit history rendering shared by both backends.
//!
//! The shell backend asks git for [`LOG_FORMAT`] and splits the output on
//! [`RECORD_SEPARATOR`]; the libgit2 backend renders the same layout itself
//! through [`render_commit`], so both produce identical entries.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::Commit;

/// `git log --pretty` format producing one record per commit.
pub const LOG_FORMAT: &str = "--pretty=format:Commit: %H%nAuthor: %an <%ae>%nDate: %ad%nMessage: %s%n";

/// Blank line between two records of [`LOG_FORMAT`] output.
pub const RECORD_SEPARATOR: &str = "\n\n";

/// Matches git's default `%ad` rendering, e.g. `Thu Oct 16 09:05:00 2026 +0200`.
const GIT_DEFAULT_DATE: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Split `git log` output produced with [`LOG_FORMAT`] into records.
pub fn parse_log_output(output: &str) -> Vec<String> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split(RECORD_SEPARATOR)
        .map(|entry| entry.trim_end().to_string())
        .collect()
}

/// Render a commit exactly like one record of [`LOG_FORMAT`].
pub fn render_commit(commit: &Commit<'_>) -> String {
    let author = commit.author();
    let when = author.when();
    let date = format_git_date(when.seconds(), when.offset_minutes());

    format!(
        "Commit: {}\nAuthor: {} <{}>\nDate: {}\nMessage: {}",
        commit.id(),
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or(""),
        date,
        commit.summary().unwrap_or("")
    )
}

fn format_git_date(seconds: i64, offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    let dt: DateTime<FixedOffset> = Utc
        .timestamp_opt(seconds, 0)
        .single()
        .unwrap_or_default()
        .with_timezone(&offset);
    dt.format(GIT_DEFAULT_DATE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_splits_records() {
        let output = "Commit: aaa\nAuthor: A <a@x>\nDate: d1\nMessage: second\n\n\
                      Commit: bbb\nAuthor: B <b@x>\nDate: d2\nMessage: first\n";
        let entries = parse_log_output(output);
        assert_eq!(
            entries,
            vec![
                "Commit: aaa\nAuthor: A <a@x>\nDate: d1\nMessage: second".to_string(),
                "Commit: bbb\nAuthor: B <b@x>\nDate: d2\nMessage: first".to_string(),
            ]
        );
    }

    #[test]
    fn parse_empty_output() {
        assert!(parse_log_output("").is_empty());
        assert!(parse_log_output("\n").is_empty());
    }

    #[test]
    fn date_matches_git_default_layout() {
        // 2021-01-02T03:04:05Z
        assert_eq!(format_git_date(1_609_556_645, 0), "Sat Jan 2 03:04:05 2021 +0000");
        assert_eq!(format_git_date(1_609_556_645, 120), "Sat Jan 2 05:04:05 2021 +0200");
    }
}
