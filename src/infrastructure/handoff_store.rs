//! 阶段交接存储 - 基础设施层
//!
//! 题目提交成功后记下科目和考试类型，答题卡评分阶段从这里读默认值

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::ExamMeta;

pub struct HandoffStore {
    path: PathBuf,
}

impl HandoffStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 覆盖写入
    pub async fn save(&self, meta: &ExamMeta) -> Result<()> {
        let content = toml::to_string(meta)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::file(self.path.display().to_string(), e))?;
        debug!("已写入阶段交接文件: {}", self.path.display());
        Ok(())
    }

    /// 文件不存在时返回 None
    pub async fn load(&self) -> Result<Option<ExamMeta>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::file(self.path.display().to_string(), e)),
        }
    }
}
