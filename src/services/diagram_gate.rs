//! 配图闸门 - 业务能力层
//!
//! 记录每道需要配图的题是否已经有图，给出唯一的"能否提交"判断。
//! 纯同步，无 I/O。

use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::models::{ImageFile, QuestionSet};

/// 配图闸门
///
/// 只为 `requires_diagram = true` 的题目建条目，`None` 表示还没上传
#[derive(Debug, Clone, Default)]
pub struct DiagramGate {
    attachments: BTreeMap<u32, Option<ImageFile>>,
}

impl DiagramGate {
    /// 为一组题目初始化闸门，所有需要配图的题都是 `None`
    pub fn for_questions(questions: &QuestionSet) -> Self {
        Self {
            attachments: questions.diagram_qnos().map(|qno| (qno, None)).collect(),
        }
    }

    /// 覆盖指定题目的配图
    pub fn attach(&mut self, qno: u32, file: ImageFile) -> Result<()> {
        let slot = self.slot_mut(qno)?;
        *slot = Some(file);
        Ok(())
    }

    /// 清除指定题目的配图
    pub fn detach(&mut self, qno: u32) -> Result<()> {
        let slot = self.slot_mut(qno)?;
        *slot = None;
        Ok(())
    }

    /// 每道需要配图的题都有图时才允许提交
    pub fn is_submission_allowed(&self) -> bool {
        self.attachments.values().all(Option::is_some)
    }

    /// 还缺配图的题号（升序）
    pub fn missing(&self) -> Vec<u32> {
        self.attachments
            .iter()
            .filter(|(_, file)| file.is_none())
            .map(|(&qno, _)| qno)
            .collect()
    }

    /// 已上传的配图（按题号升序）
    pub fn attached(&self) -> impl Iterator<Item = (u32, &ImageFile)> {
        self.attachments
            .iter()
            .filter_map(|(&qno, file)| file.as_ref().map(|f| (qno, f)))
    }

    pub fn required_count(&self) -> usize {
        self.attachments.len()
    }

    fn slot_mut(&mut self, qno: u32) -> Result<&mut Option<ImageFile>> {
        self.attachments.get_mut(&qno).ok_or_else(|| {
            AppError::Validation(format!("Question {} does not require a diagram.", qno))
        })
    }
}
