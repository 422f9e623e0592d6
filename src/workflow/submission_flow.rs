//! 题目提交流程 - 流程层
//!
//! 核心职责：定义"一个 issue"的完整处理流程
//!
//! 流程顺序：
//! 1. 触发条件检查（labeled + approved），不满足则静默跳过
//! 2. 解析 issue 正文
//! 3. 追加到题库文件
//! 4. 提交并推送
//! 5. 关闭 issue
//!
//! 2-5 任一步失败：在 issue 下评论失败原因，返回错误，不回滚已完成的步骤。

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::clients::{IssueTracker, VersionControl};
use crate::error::{AppError, AppResult};
use crate::models::{IssueEvent, Question};
use crate::services::collection_store::{AppendOutcome, CollectionStore};
use crate::services::section_parser::parse_body;
use crate::utils::truncate_text;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 只处理 issues 事件
pub const ISSUES_EVENT: &str = "issues";
/// 只处理添加标签的动作
pub const LABELED_ACTION: &str = "labeled";

/// 检查事件类型
pub fn check_event_kind(event_name: &str) -> Option<IgnoreReason> {
    (event_name != ISSUES_EVENT).then(|| IgnoreReason::EventKind(event_name.to_string()))
}

/// 处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 题目已写入、提交并关闭 issue
    Added(AppendOutcome),
    /// 不满足触发条件，什么都没做
    Ignored(IgnoreReason),
}

/// 跳过的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 不是 issues 事件
    EventKind(String),
    /// 不是 labeled 动作
    Action(String),
    /// 标签不匹配
    Label(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::EventKind(name) => write!(f, "Not an issue action: {:?}", name),
            IgnoreReason::Action(action) => write!(f, "Ignoring issue action: {:?}", action),
            IgnoreReason::Label(label) => write!(f, "Ignoring label {:?}", label),
        }
    }
}

/// 流程步骤，用于拼装失败评论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Update,
    Commit,
    Close,
}

impl Stage {
    fn failure_prefix(self) -> &'static str {
        match self {
            Stage::Parse => "Failed parsing question body",
            Stage::Update => "Failed updating question collection",
            Stage::Commit => "Failed committing question collection",
            Stage::Close => "Failed closing issue",
        }
    }

    /// 失败评论内容
    pub fn failure_message(self, err: &AppError) -> String {
        format!("{}: {}", self.failure_prefix(), err)
    }
}

/// 提交处理流程
///
/// - 编排 解析 → 写题库 → 提交 → 关闭 的顺序
/// - 协作方（issue 系统、git）通过构造时注入
/// - 每一步都以上一步成功为前提
pub struct SubmissionHandler<T, V> {
    tracker: T,
    vcs: V,
    store: CollectionStore,
    approved_label: String,
}

impl<T, V> SubmissionHandler<T, V>
where
    T: IssueTracker,
    V: VersionControl,
{
    /// 创建新的提交处理流程
    pub fn new(tracker: T, vcs: V, store: CollectionStore, approved_label: impl Into<String>) -> Self {
        Self {
            tracker,
            vcs,
            store,
            approved_label: approved_label.into(),
        }
    }

    /// 检查动作和标签
    pub fn check_gate(&self, event: &IssueEvent) -> Option<IgnoreReason> {
        if event.action != LABELED_ACTION {
            return Some(IgnoreReason::Action(event.action.clone()));
        }
        let label = event.label_name();
        if label != self.approved_label {
            return Some(IgnoreReason::Label(label.to_string()));
        }
        None
    }

    /// 处理一个 issues 事件
    pub async fn handle(&self, event_name: &str, event: &IssueEvent) -> AppResult<ProcessResult> {
        if let Some(reason) =
            check_event_kind(event_name).or_else(|| self.check_gate(event))
        {
            debug!("{}", reason);
            return Ok(ProcessResult::Ignored(reason));
        }

        let ctx = SubmissionCtx::from(&event.issue);
        info!("{} 📥 开始处理题目提交", ctx);

        // ========== 1. 解析正文 ==========
        let question = self
            .step(&ctx, Stage::Parse, parse_body(event.issue.body()).map_err(AppError::from))
            .await?;
        self.log_question(&ctx, &question);

        // ========== 2. 写入题库 ==========
        let outcome = self
            .step(
                &ctx,
                Stage::Update,
                self.store.append(&question).map_err(AppError::from),
            )
            .await?;

        // ========== 3. 提交并推送 ==========
        let message = ctx.commit_message();
        self.step(
            &ctx,
            Stage::Commit,
            self.vcs
                .commit_and_push(std::slice::from_ref(&outcome.path), &message)
                .await,
        )
        .await?;

        // ========== 4. 关闭 issue ==========
        self.step(
            &ctx,
            Stage::Close,
            self.tracker.close_issue(ctx.issue_number).await,
        )
        .await?;

        info!(
            "{} ✅ 处理完成: {} (共 {} 题)",
            ctx,
            outcome.path.display(),
            outcome.total()
        );
        Ok(ProcessResult::Added(outcome))
    }

    /// 步骤失败时在 issue 下评论，然后原样返回错误
    async fn step<R>(&self, ctx: &SubmissionCtx, stage: Stage, result: AppResult<R>) -> AppResult<R> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let message = stage.failure_message(&err);
        if err.is_malformed_input() {
            warn!("{} ⚠️ {}", ctx, message);
        } else {
            error!("{} ❌ {}", ctx, message);
        }

        if let Err(comment_err) = self.tracker.create_comment(ctx.issue_number, &message).await {
            error!("{} ❌ 发表失败评论也失败了: {}", ctx, comment_err);
        }
        Err(err)
    }

    /// 显示题目概要
    fn log_question(&self, ctx: &SubmissionCtx, question: &Question) {
        info!(
            "{} 题干: {} | 选项: {} | 题库: {}",
            ctx,
            truncate_text(question.text(), 60),
            question.options.len(),
            question.page()
        );
        match question.answer() {
            None => warn!("{} ⚠️ 未提供 answer，将按 0 写入", ctx),
            Some(answer) if !question.answer_in_range() => warn!(
                "{} ⚠️ answer {} 超出选项范围 (共 {} 个选项)",
                ctx,
                answer,
                question.options.len()
            ),
            Some(_) => {}
        }
    }
}
