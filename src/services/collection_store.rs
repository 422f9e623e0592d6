//! 题库文件服务 - 业务能力层
//!
//! 只负责"把一道题追加到某个题库文件"能力。
//!
//! 题库文件是 `<page>.json`，内容为题目数组。追加时先完整读入原有题目，
//! 再写入同目录下的临时文件，最后原子地 rename 覆盖原文件，
//! 任何一步失败原文件都保持不变。

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::Question;

/// 题库文件扩展名
pub const COLLECTION_EXTENSION: &str = "json";

fn routing_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}_.\-]+(/[\p{L}\p{N}_.\-]+)*$").expect("routing key pattern is valid")
    })
}

/// 一次追加的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// 被更新的题库文件
    pub path: PathBuf,
    /// 追加前的题目数量
    pub previous_len: usize,
}

impl AppendOutcome {
    pub fn total(&self) -> usize {
        self.previous_len + 1
    }
}

/// 题库文件服务
///
/// 职责：
/// - 根据路由键定位题库文件，且只允许访问题库目录内的文件
/// - 读入、追加、原子写回
/// - 不创建新的题库文件
#[derive(Debug, Clone)]
pub struct CollectionStore {
    root: PathBuf,
}

impl CollectionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 根据路由键得到题库文件路径
    ///
    /// 路由键由 `/` 分隔的若干段组成，每段只含字母、数字（含中文等 Unicode 字符）、`_`、`-`、`.`，
    /// 不允许 `.` 或 `..` 段。解析后的真实路径必须位于题库目录内，且文件必须已存在。
    pub fn resolve(&self, page: &str) -> Result<PathBuf, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidRoutingKey {
            key: page.to_string(),
            reason: reason.to_string(),
        };

        if page.is_empty() {
            return Err(invalid("empty"));
        }
        if !routing_key_pattern().is_match(page) {
            return Err(invalid("unsupported characters"));
        }
        if page.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(invalid("relative segment"));
        }

        let path = self
            .root
            .join(format!("{}.{}", page, COLLECTION_EXTENSION));

        let canonical_root = self.root.canonicalize().map_err(|source| StoreError::ReadFailed {
            path: self.root.display().to_string(),
            source,
        })?;
        let canonical_path = match path.canonicalize() {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: path.display().to_string(),
                })
            }
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        if !canonical_path.starts_with(&canonical_root) {
            return Err(StoreError::OutsideRoot {
                path: path.display().to_string(),
            });
        }

        debug!("路由键 {} -> {}", page, path.display());
        Ok(path)
    }

    /// 读取题库文件中的全部题目
    pub fn load(&self, path: &Path) -> Result<Vec<Question>, StoreError> {
        let mut file = open_existing(path)?;
        read_collection(&mut file, path)
    }

    /// 把题目追加到其路由键对应的题库文件
    pub fn append(&self, question: &Question) -> Result<AppendOutcome, StoreError> {
        let path = self.resolve(question.page())?;

        // 句柄只在这个作用域内存活，提前返回时同样会关闭
        let (mut questions, permissions) = {
            let mut file = open_existing(&path)?;
            let permissions = file
                .metadata()
                .map_err(|source| StoreError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                })?
                .permissions();
            (read_collection(&mut file, &path)?, permissions)
        };

        let previous_len = questions.len();
        questions.push(question.clone());

        write_collection(&path, &questions, Some(permissions))?;

        info!(
            "✓ 已写入 {} (题目数: {} -> {})",
            path.display(),
            previous_len,
            previous_len + 1
        );

        Ok(AppendOutcome { path, previous_len })
    }
}

/// 写入同目录临时文件后 rename 覆盖目标文件
///
/// 失败时临时文件随 `NamedTempFile` 一起删除，目标文件保持原样。
fn write_collection(
    path: &Path,
    questions: &[Question],
    permissions: Option<fs::Permissions>,
) -> Result<(), StoreError> {
    let path_str = path.display().to_string();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failed(&path_str, e))?;
    serde_json::to_writer_pretty(&mut tmp, questions).map_err(|e| write_failed(&path_str, e))?;
    tmp.write_all(b"\n").map_err(|e| write_failed(&path_str, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| write_failed(&path_str, e))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions).map_err(|e| write_failed(&path_str, e))?;
    }
    tmp.persist(path)
        .map_err(|e| write_failed(&path_str, e.error))?;
    Ok(())
}

fn open_existing(path: &Path) -> Result<fs::File, StoreError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                StoreError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                }
            }
        })
}

fn read_collection(file: &mut fs::File, path: &Path) -> Result<Vec<Question>, StoreError> {
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|source| StoreError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| StoreError::DecodeFailed {
        path: path.display().to_string(),
        source,
    })
}

fn write_failed(path: &str, source: impl std::error::Error + Send + Sync + 'static) -> StoreError {
    StoreError::WriteFailed {
        path: path.to_string(),
        source: Box::new(source),
    }
}
