mod entry_writer;
mod stanza_writer;

use std::{result::Result as StdResult, str::FromStr};

use indexmap::IndexSet;
use strum::{Display, EnumString};

pub use self::{entry_writer::EntryWriter, stanza_writer::StanzaWriter};
use crate::{error::Result, git::Commit, gitdch::GitDch};

/// The maximum width of a rendered changelog line, including indentation
pub const MAX_LINE_WIDTH: usize = 79;

// First line of an entry gets the bullet, any wrapped remainder the plain
// indent.
const BULLET: &str = "    - ";
const CONTINUATION: &str = "      ";

// A subject+suffix at or under this length is emitted as a single line
// without invoking the wrapper.
const ONE_LINE_MAX: usize = MAX_LINE_WIDTH - 4;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ChangelogFormat {
    #[default]
    Entries,
    Stanza,
}

impl<'de> serde::de::Deserialize<'de> for ChangelogFormat {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A trait that allows writing the commits collected by a `gitdch` run in an
/// arbitrary output layout.
///
/// `gitdch` provides two default implementors of this trait,
/// `gitdch::fmt::EntryWriter` for the bare entry block and
/// `gitdch::fmt::StanzaWriter` for a complete `debian/changelog` stanza.
pub trait FormatWriter {
    /// Writes changelog output for the given commits, newest first
    fn write_changelog(&mut self, options: &GitDch, commits: &[Commit]) -> Result<()>;
}

/// Renders a single commit as changelog entry lines.
///
/// The author is credited in square brackets unless their display name is in
/// `team`, and any referenced bugs are appended as `(LP: ...)`. Entries that
/// do not fit in `MAX_LINE_WIDTH` columns are word-wrapped onto continuation
/// lines.
///
/// # Example
///
/// ```
/// # use gitdch::{fmt, git::Commit};
/// # use indexmap::IndexSet;
/// let commit = Commit {
///     subject: "fix the thing".into(),
///     author: "Jane Doe <jane@example.com>".into(),
///     bugs: vec!["123456".into()],
/// };
/// let lines = fmt::format_entry(&commit, &IndexSet::new());
/// assert_eq!(lines, vec!["    - fix the thing [Jane Doe] (LP: 123456)"]);
/// ```
pub fn format_entry(commit: &Commit, team: &IndexSet<String>) -> Vec<String> {
    let mut name = commit
        .author
        .split(" <")
        .next()
        .unwrap_or("")
        .trim()
        .to_owned();
    if team.contains(&name) {
        name.clear();
    }

    let mut suffix = String::new();
    if !name.is_empty() {
        suffix.push_str(&format!(" [{name}]"));
    }
    if !commit.bugs.is_empty() {
        suffix.push_str(&format!(" (LP: {})", commit.bugs.join(", ")));
    }

    if commit.subject.len() + suffix.len() <= ONE_LINE_MAX {
        vec![format!("{BULLET}{}{suffix}", commit.subject)]
    } else if commit.subject.len() >= ONE_LINE_MAX {
        // The subject alone is already over-long, wrap everything as one
        // block
        wrap_entry(&[&format!("{}{suffix}", commit.subject)])
    } else {
        // The subject fits but the suffix pushes past the limit; wrapping
        // them as separate paragraphs keeps the suffix off the middle of a
        // subject line
        wrap_entry(&[&commit.subject, suffix.trim_start()])
    }
}

// Greedy word-wrap of one or more paragraphs to the reduced width, bullet on
// the first line, continuation indent on the rest. Blank lines from the wrap
// are dropped so no empty changelog lines are emitted.
fn wrap_entry(paragraphs: &[&str]) -> Vec<String> {
    let width = MAX_LINE_WIDTH - BULLET.len();
    let mut out = Vec::new();
    for para in paragraphs {
        for line in textwrap::wrap(para, width) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let prefix = if out.is_empty() { BULLET } else { CONTINUATION };
            out.push(format!("{prefix}{line}"));
        }
    }
    out
}
