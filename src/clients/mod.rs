pub mod git_client;
pub mod github_client;

pub use git_client::{GitClient, VersionControl};
pub use github_client::{GitHubClient, IssueTracker};
