use std::io;

use crate::{
    error::Result,
    fmt::{format_entry, FormatWriter},
    git::Commit,
    gitdch::GitDch,
};

/// Wraps a `std::io::Write` object to write the bare changelog entry block,
/// one bullet per commit, suitable for pasting into an existing
/// `debian/changelog` stanza.
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use gitdch::{GitDch, fmt::{FormatWriter, EntryWriter}};
/// let dch = GitDch::new().unwrap();
///
/// let mut file = File::create("entries.txt").unwrap();
/// let mut writer = EntryWriter::new(&mut file);
///
/// dch.write_changelog_with(&mut writer).unwrap();
/// ```
pub struct EntryWriter<'a>(&'a mut dyn io::Write);

impl<'a> EntryWriter<'a> {
    /// Creates a new instance of the `EntryWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write>(writer: &'a mut T) -> EntryWriter<'a> {
        EntryWriter(writer)
    }
}

impl<'a> FormatWriter for EntryWriter<'a> {
    fn write_changelog(&mut self, options: &GitDch, commits: &[Commit]) -> Result<()> {
        for commit in commits {
            for line in format_entry(commit, &options.team) {
                writeln!(self.0, "{line}")?;
            }
        }

        self.0.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_entries_in_commit_order() {
        let options = GitDch::default();
        let commits = vec![
            Commit {
                subject: "fix the thing".into(),
                author: "Scott Moser <smoser@x.com>".into(),
                bugs: vec![],
            },
            Commit {
                subject: "add another thing".into(),
                author: "Jane Doe <jane@x.com>".into(),
                bugs: vec!["42".into()],
            },
        ];

        let mut buf = Vec::new();
        EntryWriter::new(&mut buf)
            .write_changelog(&options, &commits)
            .unwrap();

        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "    - fix the thing\n    - add another thing [Jane Doe] (LP: 42)\n"
        );
    }

    #[test]
    fn no_commits_writes_nothing() {
        let options = GitDch::default();
        let mut buf = Vec::new();
        EntryWriter::new(&mut buf)
            .write_changelog(&options, &[])
            .unwrap();
        assert!(buf.is_empty());
    }
}
