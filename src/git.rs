/// The struct representation of a `Commit`
#[derive(Debug, Clone, Default)]
pub struct Commit {
    /// The commit subject
    pub subject: String,
    /// The author as recorded in the log, i.e. `Display Name <email>`
    pub author: String,
    /// Any Launchpad bug numbers referenced by the commit message
    pub bugs: Vec<String>,
}

/// A convienience type for multiple commits
pub type Commits = Vec<Commit>;
