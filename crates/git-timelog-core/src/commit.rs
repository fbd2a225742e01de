/// Read-only snapshot of one commit, taken once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Abbreviated object id, as shown by `git log --format=%h`.
    pub short_hash: String,
    /// Committer time in Unix seconds.
    pub timestamp: i64,
    /// Commit message without Git's terminal newline.
    pub message: String,
}

impl CommitRecord {
    /// Build a record from its parts.
    pub fn new(short_hash: impl Into<String>, timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            short_hash: short_hash.into(),
            timestamp,
            message: message.into(),
        }
    }
}
