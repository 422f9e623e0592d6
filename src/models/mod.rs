pub mod event;
pub mod question;

pub use event::{Issue, IssueEvent, Label};
pub use question::Question;
