use std::num::ParseIntError;

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题目正文解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 题库文件错误
    #[error("题库文件错误: {0}")]
    Store(#[from] StoreError),
    /// GitHub API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// git 提交错误
    #[error("git错误: {0}")]
    Git(#[from] GitError),
    /// 事件载荷错误
    #[error("事件错误: {0}")]
    Event(#[from] EventError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 题目正文解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 未知的段落标记
    #[error("unknown instruction {keyword:?}")]
    UnknownSection { keyword: String },
    /// 答案不是整数
    #[error("answer {value:?} is not an integer: {source}")]
    InvalidAnswer {
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// 题干为空
    #[error("question text is missing")]
    MissingQuestion,
}

/// 题库文件错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 题库文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解码失败
    #[error("解码文件失败 ({path}): {source}")]
    DecodeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 路由键不合法
    #[error("路由键 {key:?} 不合法: {reason}")]
    InvalidRoutingKey { key: String, reason: String },
    /// 目标路径不在题库目录内
    #[error("路径 {path} 不在题库目录内")]
    OutsideRoot { path: String },
}

/// GitHub API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
}

/// git 命令错误
#[derive(Debug, Error)]
pub enum GitError {
    /// 无法启动 git 进程
    #[error("无法执行 {command}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// git 命令返回非零状态
    #[error("{command} 执行失败 (status: {status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// 事件载荷错误
#[derive(Debug, Error)]
pub enum EventError {
    /// 读取事件文件失败
    #[error("读取事件文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 事件 JSON 解析失败
    #[error("解析事件文件失败 ({path}): {source}")]
    DecodeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 是否为输入本身的问题（而非环境问题）
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, AppError::Parse(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
