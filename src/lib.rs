//! # Question Bot
//!
//! 把审核通过的 issue 转换成题目并追加到题库 JSON 文件的 GitHub Action
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - 题目 `Question` 与 issues 事件载荷
//!
//! ### ② 业务能力层（Services）
//! - `SectionParser` - 把 `### 标记` 分段的正文解析成题目
//! - `CollectionStore` - 按路由键定位题库文件，读入、追加、原子写回
//!
//! ### ③ 外部协作方（Clients）
//! - `GitHubClient` - 评论、关闭 issue
//! - `GitClient` - 提交并推送题库文件
//!
//! ### ④ 流程层（Workflow）
//! - `SubmissionCtx` - 上下文封装（issue id + number）
//! - `SubmissionHandler` - 流程编排（gate → parse → store → commit → close）

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GitClient, GitHubClient, IssueTracker, VersionControl};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{IssueEvent, Question};
pub use services::{parse_body, AppendOutcome, CollectionStore};
pub use workflow::{ProcessResult, SubmissionCtx, SubmissionHandler};
