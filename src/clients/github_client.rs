/// GitHub Issues API 客户端
///
/// 只封装本程序需要的两个调用：发表评论、关闭 issue
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};

/// 提交渠道（issue 系统）
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// 在 issue 下发表评论
    async fn create_comment(&self, issue_number: u64, body: &str) -> AppResult<()>;

    /// 关闭 issue
    async fn close_issue(&self, issue_number: u64) -> AppResult<()>;
}

/// GitHub REST API 客户端
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    repository: String,
    token: String,
}

impl GitHubClient {
    /// 创建新的 GitHub 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("question-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;

        Ok(Self {
            http,
            base_url: config.github_api_base_url.trim_end_matches('/').to_string(),
            repository: config.repository.clone(),
            token: config.github_token.clone(),
        })
    }

    fn issue_url(&self, issue_number: u64) -> String {
        format!(
            "{}/repos/{}/issues/{}",
            self.base_url, self.repository, issue_number
        )
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.token)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// 检查响应状态，非 2xx 时带上响应体
    async fn check(endpoint: &str, response: reqwest::Response) -> AppResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn create_comment(&self, issue_number: u64, body: &str) -> AppResult<()> {
        let endpoint = format!("{}/comments", self.issue_url(issue_number));
        debug!("发表评论: {}", endpoint);

        let response = self
            .http
            .post(&endpoint)
            .headers(self.headers())
            .json(&json!({ "body": body }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::check(&endpoint, response).await
    }

    async fn close_issue(&self, issue_number: u64) -> AppResult<()> {
        let endpoint = self.issue_url(issue_number);
        debug!("关闭 issue: {}", endpoint);

        let response = self
            .http
            .patch(&endpoint)
            .headers(self.headers())
            .json(&json!({ "state": "closed" }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::check(&endpoint, response).await
    }
}
