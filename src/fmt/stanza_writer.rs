use std::{env, io};

use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::{
    error::Result,
    fmt::{format_entry, FormatWriter},
    git::Commit,
    gitdch::GitDch,
};

/// Wraps a `std::io::Write` object to write a complete `debian/changelog`
/// stanza: the header line, the entry block, and the maintainer trailer.
///
/// The maintainer identity for the trailer is taken from the `DEBFULLNAME`
/// and `DEBEMAIL` environment variables, the same contract `dch(1)` uses.
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use gitdch::{GitDch, fmt::{FormatWriter, StanzaWriter}};
/// let dch = GitDch::new().unwrap();
///
/// let mut file = File::create("debian/changelog").unwrap();
/// let mut writer = StanzaWriter::new(&mut file);
///
/// dch.write_changelog_with(&mut writer).unwrap();
/// ```
pub struct StanzaWriter<'a>(&'a mut dyn io::Write);

impl<'a> StanzaWriter<'a> {
    /// Creates a new instance of the `StanzaWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write>(writer: &'a mut T) -> StanzaWriter<'a> {
        StanzaWriter(writer)
    }

    fn write_header(&mut self, options: &GitDch) -> Result<()> {
        let package = options.package.clone().unwrap_or_default();
        let version = options.version.clone().unwrap_or_default();

        writeln!(
            self.0,
            "{package} ({version}) {}; urgency=medium\n",
            options.distribution
        )
        .map_err(Into::into)
    }

    fn write_trailer(&mut self) -> Result<()> {
        let name = env::var("DEBFULLNAME").unwrap_or_default();
        let email = env::var("DEBEMAIL").unwrap_or_default();
        let date = OffsetDateTime::now_utc().format(&Rfc2822)?;

        writeln!(self.0, "\n -- {name} <{email}>  {date}").map_err(Into::into)
    }
}

impl<'a> FormatWriter for StanzaWriter<'a> {
    fn write_changelog(&mut self, options: &GitDch, commits: &[Commit]) -> Result<()> {
        self.write_header(options)?;

        for commit in commits {
            for line in format_entry(commit, &options.team) {
                writeln!(self.0, "{line}")?;
            }
        }

        self.write_trailer()?;

        self.0.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_entries_and_trailer() {
        let options = GitDch::default()
            .package("cloud-utils")
            .version("0.31-1ubuntu1")
            .distribution("jammy");
        let commits = vec![Commit {
            subject: "fix the thing".into(),
            author: "Scott Moser <smoser@x.com>".into(),
            bugs: vec![],
        }];

        let mut buf = Vec::new();
        StanzaWriter::new(&mut buf)
            .write_changelog(&options, &commits)
            .unwrap();

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "cloud-utils (0.31-1ubuntu1) jammy; urgency=medium");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "    - fix the thing");
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with(" -- "));
        // double space between maintainer and date, per changelog format
        assert!(lines[4].contains(">  "));
    }
}
