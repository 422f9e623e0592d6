//! GitHub `issues` 事件载荷
//!
//! 只保留处理流程需要的字段

use std::path::Path;

use serde::Deserialize;

use crate::error::EventError;

/// issues 事件
#[derive(Debug, Clone, Deserialize)]
pub struct IssueEvent {
    /// 子动作，如 opened / labeled
    pub action: String,
    /// 本次添加的标签（仅 labeled 事件存在）
    #[serde(default)]
    pub label: Option<Label>,
    pub issue: Issue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    /// 全局 ID
    pub id: u64,
    /// 仓库内编号
    pub number: u64,
    #[serde(default)]
    pub body: Option<String>,
}

impl IssueEvent {
    /// 从事件文件加载
    pub async fn from_path(path: &Path) -> Result<Self, EventError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| EventError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| EventError::DecodeFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 标签名（无标签时为空字符串）
    pub fn label_name(&self) -> &str {
        self.label.as_ref().map(|l| l.name.as_str()).unwrap_or_default()
    }
}

impl Issue {
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
