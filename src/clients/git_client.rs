/// git 命令行客户端
///
/// 通过 `git` 可执行文件完成 config / add / commit / push
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppResult, GitError};

/// 版本控制协作方
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// 提交指定文件并推送到远端
    async fn commit_and_push(&self, paths: &[PathBuf], message: &str) -> AppResult<()>;
}

/// 调用系统 `git` 的客户端
pub struct GitClient {
    user_name: String,
    user_email: String,
    workdir: Option<PathBuf>,
}

impl GitClient {
    /// 创建新的 git 客户端，在当前目录执行
    pub fn new(config: &Config) -> Self {
        Self {
            user_name: config.git_user_name.clone(),
            user_email: config.git_user_email.clone(),
            workdir: None,
        }
    }

    /// 执行一条 git 命令，非零退出视为失败
    async fn run<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> =
            args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        debug!("执行: {}", command);

        let mut cmd = Command::new("git");
        cmd.args(&args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| GitError::SpawnFailed {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// 设置提交身份
    pub async fn configure_identity(&self) -> Result<(), GitError> {
        self.run(["config", "user.name", self.user_name.as_str()])
            .await?;
        self.run(["config", "user.email", self.user_email.as_str()])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VersionControl for GitClient {
    async fn commit_and_push(&self, paths: &[PathBuf], message: &str) -> AppResult<()> {
        self.configure_identity().await?;

        let mut add = vec![OsStr::new("add"), OsStr::new("--")];
        add.extend(paths.iter().map(|p| p.as_os_str()));
        self.run(add).await?;

        self.run(["commit", "-m", message]).await?;
        self.run(["push"]).await?;

        info!("✓ 已提交并推送: {}", message);
        Ok(())
    }
}
