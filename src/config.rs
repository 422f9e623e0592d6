use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
///
/// 启动时通过 [`Config::load`] 一次性构建并校验，之后显式传入各组件。
#[derive(Clone, Debug)]
pub struct Config {
    /// GitHub API 令牌
    pub github_token: String,
    /// GitHub API 地址
    pub github_api_base_url: String,
    /// 仓库名 (owner/name)
    pub repository: String,
    /// 触发事件名
    pub event_name: String,
    /// 事件载荷文件路径
    pub event_path: PathBuf,
    /// 题库 JSON 文件所在目录
    pub collections_dir: PathBuf,
    // --- git 提交身份 ---
    pub git_user_name: String,
    pub git_user_email: String,
    /// 触发处理的标签
    pub approved_label: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// 配置文件中允许出现的字段（不含任何凭据）
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    github_api_base_url: Option<String>,
    collections_dir: Option<PathBuf>,
    git_user_name: Option<String>,
    git_user_email: Option<String>,
    approved_label: Option<String>,
    verbose_logging: Option<bool>,
}

impl FileConfig {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::FileParseFailed {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Config {
    pub const DEFAULT_API_BASE_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_GIT_USER_NAME: &'static str = "bot";
    pub const DEFAULT_GIT_USER_EMAIL: &'static str = "bot@learn.github.com";
    pub const DEFAULT_APPROVED_LABEL: &'static str = "approved";

    /// 从进程环境加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// `QUESTION_BOT_CONFIG` 指向的 TOML 文件提供默认值，环境变量覆盖文件。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup("QUESTION_BOT_CONFIG") {
            Some(path) => FileConfig::from_path(Path::new(&path))?,
            None => FileConfig::default(),
        };

        let required = |var_name: &str| {
            lookup(var_name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::EnvVarNotFound {
                    var_name: var_name.to_string(),
                })
        };

        let verbose_logging = match lookup("VERBOSE_LOGGING") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "VERBOSE_LOGGING".to_string(),
                    value,
                    expected_type: "bool".to_string(),
                })?,
            None => file.verbose_logging.unwrap_or(false),
        };

        Ok(Self {
            github_token: required("GITHUB_TOKEN")?,
            github_api_base_url: lookup("GITHUB_API_URL")
                .or(file.github_api_base_url)
                .unwrap_or_else(|| Self::DEFAULT_API_BASE_URL.to_string()),
            repository: required("GITHUB_REPOSITORY")?,
            event_name: required("GITHUB_EVENT_NAME")?,
            event_path: required("GITHUB_EVENT_PATH")?.into(),
            collections_dir: lookup("QUESTION_BOT_COLLECTIONS_DIR")
                .map(PathBuf::from)
                .or(file.collections_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            git_user_name: lookup("QUESTION_BOT_GIT_USER_NAME")
                .or(file.git_user_name)
                .unwrap_or_else(|| Self::DEFAULT_GIT_USER_NAME.to_string()),
            git_user_email: lookup("QUESTION_BOT_GIT_USER_EMAIL")
                .or(file.git_user_email)
                .unwrap_or_else(|| Self::DEFAULT_GIT_USER_EMAIL.to_string()),
            approved_label: lookup("QUESTION_BOT_APPROVED_LABEL")
                .or(file.approved_label)
                .unwrap_or_else(|| Self::DEFAULT_APPROVED_LABEL.to_string()),
            verbose_logging,
        })
    }

    /// 是否运行在 GitHub Actions 中
    pub fn running_in_ci() -> bool {
        std::env::var("GITHUB_ACTIONS").map(|v| v == "true").unwrap_or(false)
    }
}
