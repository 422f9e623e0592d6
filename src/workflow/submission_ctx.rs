//! 提交处理上下文
//!
//! 封装"我正在处理哪个 issue"这一信息

use std::fmt::Display;

use crate::models::Issue;

/// 提交处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionCtx {
    /// issue 全局 ID（用于提交信息）
    pub issue_id: u64,

    /// issue 在仓库内的编号（用于 API 调用和日志）
    pub issue_number: u64,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(issue_id: u64, issue_number: u64) -> Self {
        Self {
            issue_id,
            issue_number,
        }
    }

    /// 提交信息
    pub fn commit_message(&self) -> String {
        format!("Update question from issue #{}", self.issue_id)
    }
}

impl From<&Issue> for SubmissionCtx {
    fn from(issue: &Issue) -> Self {
        Self::new(issue.id, issue.number)
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Issue #{}]", self.issue_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_commit_message() {
        let ctx = SubmissionCtx::new(123456789, 12);
        assert_eq!(ctx.to_string(), "[Issue #12]");
        assert_eq!(ctx.commit_message(), "Update question from issue #123456789");
    }
}
