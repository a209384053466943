use std::{
    env,
    fs::File,
    io::{stdout, BufWriter, Read, Write},
    path::{Path, PathBuf},
    process::Command,
};

use indexmap::IndexSet;
use log::debug;
use regex::Regex;

use crate::{
    config::RawCfg,
    error::{Error, Result},
    fmt::{ChangelogFormat, EntryWriter, FormatWriter, StanzaWriter},
    git::{Commit, Commits},
    DEFAULT_CONFIG_FILE,
};

// Maintainers whose commits are not credited in generated entries.
const DEFAULT_TEAM: &[&str] = &["Scott Moser", "Chad Smith", "Ryan Harper", "Daniel Watkins"];

/// The base struct used to set options and interact with the library.
#[derive(Debug, Clone)]
pub struct GitDch {
    /// The format of the commit output from `git log` (Defaults to: `full`)
    pub format: String,
    /// The source package name used in the stanza header
    pub package: Option<String>,
    /// The package version for the stanza header
    pub version: Option<String>,
    /// The target distribution for the stanza header (Defaults to
    /// `UNRELEASED`)
    pub distribution: String,
    /// Where to start collecting commits using a hash, tag, or ref
    pub from: Option<String>,
    /// Where to stop collecting commits using a hash, tag, or ref (Defaults
    /// to `HEAD`)
    pub to: String,
    /// Discard bug references while parsing. Used when the target changelog
    /// already carries an SRU bug placeholder and duplicate `LP:` references
    /// would conflict with it.
    pub skip_bugs: bool,
    /// The file to use as the old changelog data to be prepended to anything
    /// new found.
    pub infile: Option<String>,
    /// The file to use as the changelog output file (Defaults to `stdout`)
    pub outfile: Option<String>,
    /// Display names never credited in entries, in configuration order
    pub team: IndexSet<String>,
    /// The git dir with all the meta-data (Typically the `.git` sub-directory
    /// of the project)
    pub git_dir: Option<PathBuf>,
    /// The working directory of the git project (typically the project
    /// directory, or parent of the `.git` directory)
    pub git_work_tree: Option<PathBuf>,
    /// The regex used to find bug-reference tag lines
    pub bug_tag_regex: Regex,
    /// The regex used to pull individual bug numbers out of a tag line
    pub bug_id_regex: Regex,
    /// The layout to output the changelog in (Defaults to the bare entry
    /// block)
    pub out_format: ChangelogFormat,
}

impl Default for GitDch {
    fn default() -> Self {
        debug!("Creating default gitdch with GitDch::default()");
        GitDch {
            format: "full".to_owned(),
            package: None,
            version: None,
            distribution: "UNRELEASED".to_owned(),
            from: None,
            to: "HEAD".to_owned(),
            skip_bugs: false,
            infile: None,
            outfile: None,
            team: DEFAULT_TEAM.iter().map(|s| s.to_string()).collect(),
            git_dir: None,
            git_work_tree: None,
            bug_tag_regex: regex!(r"LP:\s*((?:#?\d+[,\s]*)+)"),
            bug_id_regex: regex!(r"\d+"),
            out_format: ChangelogFormat::Entries,
        }
    }
}

impl GitDch {
    /// Creates a default `GitDch` struct using the current working directory
    /// and searches for the default `.gitdch.toml` configuration file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        debug!("Creating default gitdch with new()");
        debug!("Trying default config file");
        GitDch::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Creates a `GitDch` struct using a specific git working directory and
    /// project directory as well as a custom named TOML configuration file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch =
    ///     GitDch::with_all("/myproject/.git", "/myproject", "/myproject/dch_conf.toml").unwrap();
    /// ```
    pub fn with_all<P: AsRef<Path>>(git_dir: P, work_tree: P, cfg_file: P) -> Result<Self> {
        debug!(
            "Creating gitdch with \n\tgit_dir: {:?}\n\twork_tree: {:?}\n\tcfg_file: {:?}",
            git_dir.as_ref(),
            work_tree.as_ref(),
            cfg_file.as_ref()
        );
        let dch = GitDch::with_dirs(git_dir, work_tree)?;
        dch.try_config_file(cfg_file.as_ref())
    }

    /// Creates a `GitDch` struct using a specific git working directory OR
    /// project directory as well as a custom named TOML configuration file.
    ///
    /// **NOTE:** If you specify a `.git` folder the parent will be used as the
    /// working tree, and vice versa.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::with_dir_and_file("/myproject", "/myproject/dch_conf.toml").unwrap();
    /// ```
    pub fn with_dir_and_file<P: AsRef<Path>>(dir: P, cfg_file: P) -> Result<Self> {
        debug!(
            "Creating gitdch with \n\tdir: {:?}\n\tcfg_file: {:?}",
            dir.as_ref(),
            cfg_file.as_ref()
        );
        let dch = GitDch::_with_dir(dir)?;
        dch.try_config_file(cfg_file.as_ref())
    }

    fn _with_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        debug!("Creating private gitdch with \n\tdir: {:?}", dir.as_ref());
        let mut dch = GitDch::default();
        if dir.as_ref().ends_with(".git") {
            debug!("dir ends with .git");
            let mut wd = dir.as_ref().to_path_buf();
            dch.git_dir = Some(wd.clone());
            wd.pop();
            dch.git_work_tree = Some(wd);
        } else {
            debug!("dir doesn't end with .git");
            let mut gd = dir.as_ref().to_path_buf();
            dch.git_work_tree = Some(gd.clone());
            gd.push(".git");
            dch.git_dir = Some(gd);
        }

        debug!("Returning gitdch:\n{:?}", dch);
        Ok(dch)
    }

    /// Creates a `GitDch` struct using a specific git working directory OR
    /// project directory. Searches for the default configuration TOML file
    /// `.gitdch.toml`
    ///
    /// **NOTE:** If you specify a `.git` folder the parent will be used as the
    /// working tree, and vice versa.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::with_dir("/myproject").unwrap();
    /// ```
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        debug!("Creating gitdch with \n\tdir: {:?}", dir.as_ref());
        let dch = GitDch::_with_dir(dir)?;
        dch.try_config_file(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Creates a `GitDch` struct using a specific git working directory AND a
    /// project directory. Searches for the default configuration TOML file
    /// `.gitdch.toml`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::with_dirs("/myproject/.git", "/myproject").unwrap();
    /// ```
    pub fn with_dirs<P: AsRef<Path>>(git_dir: P, work_tree: P) -> Result<Self> {
        debug!(
            "Creating gitdch with \n\tgit_dir: {:?}\n\twork_tree: {:?}",
            git_dir.as_ref(),
            work_tree.as_ref()
        );
        let dch = GitDch {
            git_dir: Some(git_dir.as_ref().to_path_buf()),
            git_work_tree: Some(work_tree.as_ref().to_path_buf()),
            ..GitDch::default()
        };
        dch.try_config_file(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Creates a `GitDch` struct from a custom named TOML configuration file.
    /// Sets the parent directory of the configuration file to the working
    /// tree and sibling `.git` directory as the git directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::from_file("/myproject/dch_conf.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        debug!("Creating gitdch with \n\tfile: {:?}", file.as_ref());
        // Determine if the cfg_file was relative or not
        let cfg_file = if file.as_ref().is_relative() {
            debug!("file is relative");
            let cwd = match env::current_dir() {
                Ok(d) => d,
                Err(..) => return Err(Error::CurrentDir),
            };
            Path::new(&cwd).join(file.as_ref())
        } else {
            debug!("file is absolute");
            file.as_ref().to_path_buf()
        };

        // We assume whatever dir the .gitdch.toml file is in also contains
        // the git metadata
        let mut dir = cfg_file.clone();
        dir.pop();
        GitDch::with_dir_and_file(dir, cfg_file)
    }

    // Try and apply a config file on top of the current options
    fn try_config_file(mut self, cfg_file: &Path) -> Result<Self> {
        debug!("Trying to use config file: {:?}", cfg_file);
        let mut toml_f = File::open(cfg_file)?;
        let mut toml_s = String::with_capacity(100);

        toml_f.read_to_string(&mut toml_s)?;

        toml_s.shrink_to_fit();

        let cfg: RawCfg = toml::from_str(&toml_s)
            .map_err(|_| Error::ConfigParse(cfg_file.to_path_buf()))?;

        if !cfg.team.is_empty() {
            self.team = cfg.team;
        }
        if cfg.gitdch.from_latest_tag {
            self.from = Some(self.get_latest_tag()?);
        } else if cfg.gitdch.from.is_some() {
            self.from = cfg.gitdch.from;
        }
        if let Some(to) = cfg.gitdch.to {
            self.to = to;
        }
        if let Some(dist) = cfg.gitdch.distribution {
            self.distribution = dist;
        }
        if cfg.gitdch.package.is_some() {
            self.package = cfg.gitdch.package;
        }
        if cfg.gitdch.version.is_some() {
            self.version = cfg.gitdch.version;
        }
        self.skip_bugs = cfg.gitdch.skip_bugs;
        if cfg.gitdch.outfile.is_some() {
            self.outfile = cfg.gitdch.outfile;
        }
        if cfg.gitdch.infile.is_some() {
            self.infile = cfg.gitdch.infile;
        }
        if cfg.gitdch.git_dir.is_some() {
            self.git_dir = cfg.gitdch.git_dir;
        }
        if cfg.gitdch.git_work_tree.is_some() {
            self.git_work_tree = cfg.gitdch.git_work_tree;
        }
        self.out_format = cfg.gitdch.output_format;

        if let Some(cl) = cfg.gitdch.changelog {
            self.outfile = Some(cl.clone());
            self.infile = Some(cl);
        }

        debug!("Returning gitdch:\n{:?}", self);
        Ok(self)
    }

    /// Sets the source package name used in the stanza header
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().package("cloud-utils");
    /// ```
    pub fn package<S: Into<String>>(mut self, p: S) -> GitDch {
        self.package = Some(p.into());
        self
    }

    /// Sets the package version for the stanza header
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().version("0.31-1ubuntu1");
    /// ```
    pub fn version<S: Into<String>>(mut self, v: S) -> GitDch {
        self.version = Some(v.into());
        self
    }

    /// Sets the target distribution for the stanza header (Defaults to
    /// `UNRELEASED`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().distribution("jammy");
    /// ```
    pub fn distribution<S: Into<String>>(mut self, d: S) -> GitDch {
        self.distribution = d.into();
        self
    }

    /// Sets how far back to begin collecting commits using a hash, tag, or
    /// ref
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().from("6d8183f");
    /// ```
    pub fn from<S: Into<String>>(mut self, f: S) -> GitDch {
        self.from = Some(f.into());
        self
    }

    /// Sets what point to stop collecting commits at (Defaults to `HEAD`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().to("123abc4d");
    /// ```
    pub fn to<S: Into<String>>(mut self, t: S) -> GitDch {
        self.to = t.into();
        self
    }

    /// Sets whether bug references found in commit messages are discarded
    /// instead of collected (defaults to `false`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().skip_bugs(true);
    /// ```
    pub fn skip_bugs(mut self, s: bool) -> GitDch {
        self.skip_bugs = s;
        self
    }

    /// Sets the display names which are never credited in generated entries
    ///
    /// **NOTE:** This replaces the built-in maintainer list
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().team(["Jane Doe", "John Roe"]);
    /// ```
    pub fn team<I, S>(mut self, names: I) -> GitDch
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.team = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the changelog file to output or prepend to (Defaults to `stdout`
    /// if omitted)
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().changelog("debian/changelog");
    /// ```
    pub fn changelog<S: Into<String> + Clone>(mut self, c: S) -> GitDch {
        self.infile = Some(c.clone().into());
        self.outfile = Some(c.into());
        self
    }

    /// Sets the changelog output file (Defaults to `stdout` if omitted), this
    /// is useful in conjunction with `GitDch::infile()` because it allows
    /// reading previous entries from one place and outputting to another.
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// TOML file
    ///
    /// **NOTE:** This should *not* be used in conjunction with
    /// `GitDch::changelog()`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().outfile("debian/changelog.new");
    /// ```
    pub fn outfile<S: Into<String>>(mut self, c: S) -> GitDch {
        self.outfile = Some(c.into());
        self
    }

    /// Sets the changelog input file to read previous entries from.
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// TOML file
    ///
    /// **NOTE:** This should *not* be used in conjunction with
    /// `GitDch::changelog()`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().infile("debian/changelog");
    /// ```
    pub fn infile<S: Into<String>>(mut self, c: S) -> GitDch {
        self.infile = Some(c.into());
        self
    }

    /// Sets the `git` metadata directory (typically `.git` child of your
    /// project working tree)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().git_dir("/myproject/.git");
    /// ```
    pub fn git_dir<P: AsRef<Path>>(mut self, d: P) -> GitDch {
        self.git_dir = Some(d.as_ref().to_path_buf());
        self
    }

    /// Sets the `git` working tree directory (typically your project
    /// directory)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap().git_work_tree("/myproject");
    /// ```
    pub fn git_work_tree<P: AsRef<Path>>(mut self, d: P) -> GitDch {
        self.git_work_tree = Some(d.as_ref().to_path_buf());
        self
    }

    /// The layout of the changelog output (Defaults to the bare entry block)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::{fmt::ChangelogFormat, GitDch};
    /// let dch = GitDch::new().unwrap().output_format(ChangelogFormat::Stanza);
    /// ```
    pub fn output_format(mut self, f: ChangelogFormat) -> GitDch {
        self.out_format = f;
        self
    }

    /// Retrieves a `Vec<Commit>` for the configured revision range by running
    /// `git log` with a first-parent traversal and parsing its output.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap();
    /// let commits = dch.get_commits();
    /// ```
    pub fn get_commits(&self) -> Result<Commits> {
        let range = if let Some(from) = self.from.as_ref() {
            format!("{from}..{}", self.to)
        } else {
            "HEAD".to_owned()
        };
        debug!("Getting commits for range: {:?}", range);

        let mut cmd = Command::new("git");
        for arg in [self.get_git_dir(), self.get_git_work_tree()] {
            if !arg.is_empty() {
                cmd.arg(arg);
            }
        }
        let output = cmd
            .arg("log")
            .arg("--first-parent")
            .arg("--no-decorate")
            .arg(format!("--format={}", self.format))
            .arg(&range)
            .output()?;

        Ok(self.parse_commit_log(String::from_utf8_lossy(&output.stdout).lines()))
    }

    /// Parses `git log --format=full` style output into commit records.
    ///
    /// Each record starts at a `commit <hash>` boundary line and is finalized
    /// when the next boundary (or the end of input) is seen. The `Author:`
    /// line supplies the author, the first line after the first blank line
    /// supplies the subject, and any later line carrying an `LP:` tag
    /// contributes bug numbers. Lines that match nothing are skipped, and
    /// missing fields are simply left empty.
    pub fn parse_commit_log<I, S>(&self, lines: I) -> Commits
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut commits = vec![];
        let mut current: Option<Commit> = None;
        // Set once the blank line before the subject has been seen
        let mut want_subject = false;
        let mut have_subject = false;

        for line in lines {
            let line = line.as_ref();
            if line.starts_with("commit ") {
                if let Some(commit) = current.take() {
                    commits.push(commit);
                }
                current = Some(Commit::default());
                want_subject = false;
                have_subject = false;
                continue;
            }
            let commit = match current.as_mut() {
                Some(c) => c,
                // Anything before the first boundary is noise
                None => continue,
            };
            if want_subject {
                commit.subject = line.trim().to_owned();
                want_subject = false;
                have_subject = true;
            } else if let Some(author) = line.strip_prefix("Author:") {
                commit.author = author.trim().to_owned();
            } else if !have_subject && line.trim().is_empty() {
                want_subject = true;
            } else if let Some(caps) = self.bug_tag_regex.captures(line) {
                if self.skip_bugs {
                    debug!("Discarding bug references from: {:?}", line);
                    continue;
                }
                if let Some(ids) = caps.get(1) {
                    for id in self.bug_id_regex.find_iter(ids.as_str()) {
                        commit.bugs.push(id.as_str().to_owned());
                    }
                }
            }
        }
        if let Some(commit) = current.take() {
            commits.push(commit);
        }

        commits
    }

    /// Retrieves the latest tagged commit from the git directory
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap();
    /// let tag = dch.get_latest_tag().unwrap();
    /// ```
    pub fn get_latest_tag(&self) -> Result<String> {
        let mut cmd = Command::new("git");
        for arg in [self.get_git_dir(), self.get_git_work_tree()] {
            if !arg.is_empty() {
                cmd.arg(arg);
            }
        }
        let output = cmd
            .arg("rev-list")
            .arg("--tags")
            .arg("--max-count=1")
            .output()?;
        let buf = String::from_utf8_lossy(&output.stdout);

        Ok(buf.trim_matches('\n').to_owned())
    }

    fn get_git_work_tree(&self) -> String {
        match self.git_work_tree.as_ref() {
            Some(wt) => format!("--work-tree={}", wt.display()),
            None => "".to_owned(),
        }
    }

    fn get_git_dir(&self) -> String {
        match self.git_dir.as_ref() {
            Some(gd) => format!("--git-dir={}", gd.display()),
            None => "".to_owned(),
        }
    }

    /// Writes the changelog using whatever options have been specified thus
    /// far.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap();
    /// dch.write_changelog();
    /// ```
    pub fn write_changelog(&self) -> Result<()> {
        debug!("Writing changelog with preset options");
        if let Some(ref cl) = self.outfile {
            debug!("outfile set to: {:?}", cl);
            self.write_changelog_to(cl)
        } else if let Some(ref cl) = self.infile {
            debug!("outfile not set but infile set to: {:?}", cl);
            self.write_changelog_from(cl)
        } else {
            debug!("outfile and infile not set using stdout");
            let out = stdout();
            let mut out_buf = BufWriter::new(out.lock());
            match self.out_format {
                ChangelogFormat::Entries => {
                    let mut writer = EntryWriter::new(&mut out_buf);
                    self.write_changelog_with(&mut writer)
                }
                ChangelogFormat::Stanza => {
                    let mut writer = StanzaWriter::new(&mut out_buf);
                    self.write_changelog_with(&mut writer)
                }
            }
        }
    }

    /// Writes the changelog to a specified file, prepending the new entries
    /// to the file's previous content if it exists (changelogs are newest
    /// first), or creating the file if it doesn't.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap();
    ///
    /// dch.write_changelog_to("debian/changelog").unwrap();
    /// ```
    pub fn write_changelog_to<P: AsRef<Path>>(&self, cl: P) -> Result<()> {
        debug!("Writing changelog to file: {:?}", cl.as_ref());
        let mut contents = String::with_capacity(256);
        if let Some(ref infile) = self.infile {
            debug!("infile set to: {:?}", infile);
            File::open(infile)
                .map(|mut f| f.read_to_string(&mut contents).ok())
                .ok();
        } else {
            debug!("infile not set, trying the outfile");
            File::open(cl.as_ref())
                .map(|mut f| f.read_to_string(&mut contents).ok())
                .ok();
        }
        contents.shrink_to_fit();

        let mut file = File::create(cl.as_ref())?;
        match self.out_format {
            ChangelogFormat::Entries => {
                let mut writer = EntryWriter::new(&mut file);
                self.write_changelog_with(&mut writer)?;
            }
            ChangelogFormat::Stanza => {
                let mut writer = StanzaWriter::new(&mut file);
                self.write_changelog_with(&mut writer)?;
            }
        }
        if !contents.is_empty() {
            writeln!(&mut file)?;
            file.write_all(contents.as_bytes())?;
        }

        Ok(())
    }

    /// Writes the changelog from a specified input file, prepending new
    /// entries to its content on stdout or the configured outfile.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitdch::GitDch;
    /// let dch = GitDch::new().unwrap();
    ///
    /// dch.write_changelog_from("debian/changelog").unwrap();
    /// ```
    pub fn write_changelog_from<P: AsRef<Path>>(&self, cl: P) -> Result<()> {
        debug!("Writing changelog from file: {:?}", cl.as_ref());
        let mut contents = String::with_capacity(256);
        File::open(cl.as_ref())
            .map(|mut f| f.read_to_string(&mut contents).ok())
            .ok();
        contents.shrink_to_fit();

        if let Some(ref ofile) = self.outfile {
            debug!("outfile set to: {:?}", ofile);
            let mut file = File::create(ofile)?;
            match self.out_format {
                ChangelogFormat::Entries => {
                    let mut writer = EntryWriter::new(&mut file);
                    self.write_changelog_with(&mut writer)?;
                }
                ChangelogFormat::Stanza => {
                    let mut writer = StanzaWriter::new(&mut file);
                    self.write_changelog_with(&mut writer)?;
                }
            }
            if !contents.is_empty() {
                writeln!(&mut file)?;
                file.write_all(contents.as_bytes())?;
            }
        } else {
            debug!("outfile not set, using stdout");
            let out = stdout();
            let mut out_buf = BufWriter::new(out.lock());
            match self.out_format {
                ChangelogFormat::Entries => {
                    let mut writer = EntryWriter::new(&mut out_buf);
                    self.write_changelog_with(&mut writer)?;
                }
                ChangelogFormat::Stanza => {
                    let mut writer = StanzaWriter::new(&mut out_buf);
                    self.write_changelog_with(&mut writer)?;
                }
            }
            if !contents.is_empty() {
                writeln!(&mut out_buf)?;
                out_buf.write_all(contents.as_bytes())?;
            }
        }

        Ok(())
    }

    /// Writes a changelog with a specified `FormatWriter`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use gitdch::{GitDch, fmt::{FormatWriter, EntryWriter}};
    /// # use std::io;
    /// let dch = GitDch::new().unwrap();
    ///
    /// // Write changelog entries to stdout
    /// let out = io::stdout();
    /// let mut out_buf = io::BufWriter::new(out.lock());
    /// let mut writer = EntryWriter::new(&mut out_buf);
    ///
    /// dch.write_changelog_with(&mut writer).unwrap();
    /// ```
    pub fn write_changelog_with<W>(&self, writer: &mut W) -> Result<()>
    where
        W: FormatWriter,
    {
        debug!("Writing changelog from writer");
        let commits = self.get_commits()?;

        writer.write_changelog(self, &commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
commit 1111111111111111111111111111111111111111
Author: Jane Doe <jane@x.com>
Commit: Jane Doe <jane@x.com>

    add feature X

    Some explanation of the feature.

    LP: #1
    LP: #2, #3
commit 2222222222222222222222222222222222222222
Author: Scott Moser <smoser@x.com>
Commit: Scott Moser <smoser@x.com>

    fix the thing
";

    #[test]
    fn parses_records_in_input_order() {
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(LOG.lines());
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].subject, "add feature X");
        assert_eq!(commits[0].author, "Jane Doe <jane@x.com>");
        assert_eq!(commits[1].subject, "fix the thing");
        assert_eq!(commits[1].author, "Scott Moser <smoser@x.com>");
    }

    #[test]
    fn bug_tags_accumulate_across_lines() {
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(LOG.lines());
        assert_eq!(commits[0].bugs, vec!["1", "2", "3"]);
        assert!(commits[1].bugs.is_empty());
    }

    #[test]
    fn skip_bugs_discards_references() {
        let dch = GitDch::default().skip_bugs(true);
        let commits = dch.parse_commit_log(LOG.lines());
        assert_eq!(commits.len(), 2);
        assert!(commits[0].bugs.is_empty());
    }

    #[test]
    fn duplicate_bug_ids_are_kept() {
        let log = "\
commit aaaa
Author: Jane Doe <jane@x.com>

    subject

    LP: #7
    LP: #7
";
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(log.lines());
        assert_eq!(commits[0].bugs, vec!["7", "7"]);
    }

    #[test]
    fn last_record_is_flushed_at_end_of_input() {
        let log = "commit aaaa\nAuthor: Jane Doe <jane@x.com>\n\n    tail commit";
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(log.lines());
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "tail commit");
    }

    #[test]
    fn empty_input_yields_no_commits() {
        let dch = GitDch::default();
        assert!(dch.parse_commit_log(Vec::<&str>::new()).is_empty());
        assert!(dch.parse_commit_log("".lines()).is_empty());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let log = "commit aaaa\nsome stray line\n";
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(log.lines());
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "");
        assert_eq!(commits[0].author, "");
        assert!(commits[0].bugs.is_empty());
    }

    #[test]
    fn committer_line_is_not_mistaken_for_a_boundary() {
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(LOG.lines());
        // `Commit:` lines in full format must not start a new record
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn malformed_bug_tag_contributes_nothing() {
        let log = "commit aaaa\nAuthor: A <a@x>\n\n    s\n\n    LP: none yet\n";
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(log.lines());
        assert!(commits[0].bugs.is_empty());
    }

    #[test]
    fn end_to_end_entry_block() {
        use crate::fmt::{format_entry, MAX_LINE_WIDTH};

        let log = "\
commit 1111111111111111111111111111111111111111
Author: Scott Moser <smoser@x.com>

    fix the thing
commit 2222222222222222222222222222222222222222
Author: Jane Doe <jane@x.com>

    add feature X with a much longer description that will not fit on one single eighty column line at all

    LP: #99999
";
        let dch = GitDch::default();
        let commits = dch.parse_commit_log(log.lines());
        let mut lines = vec![];
        for commit in &commits {
            lines.extend(format_entry(commit, &dch.team));
        }

        assert_eq!(lines[0], "    - fix the thing");
        assert!(lines[1].starts_with("    - add feature X"));
        for line in &lines[2..] {
            assert!(line.starts_with("      "));
        }
        for line in &lines {
            assert!(line.len() <= MAX_LINE_WIDTH, "too wide: {line:?}");
        }
        let joined = lines.join(" ");
        assert!(joined.contains("[Jane Doe]"));
        assert!(joined.contains("(LP: 99999)"));
    }
}
