use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// 抽取服务在需要配图的题目末尾追加的标记
pub const DIAGRAM_MARKER: &str = "(requires diagram)";

/// 一道抽取出来的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 题号，从 1 开始
    pub qno: u32,
    /// 题干（已去掉配图标记）
    pub text: String,
    /// 是否需要老师补充配图
    pub requires_diagram: bool,
}

/// 提交给后端的题目条目，不包含配图标记
#[derive(Debug, Clone, Serialize)]
pub struct QuestionPayload<'a> {
    pub qno: u32,
    pub question: &'a str,
}

impl<'a> From<&'a Question> for QuestionPayload<'a> {
    fn from(q: &'a Question) -> Self {
        Self {
            qno: q.qno,
            question: &q.text,
        }
    }
}

/// 按题号升序排列的题目集合
///
/// 同时维护 qno → 位置 的索引
#[derive(Debug, Clone, Default)]
pub struct QuestionSet {
    questions: Vec<Question>,
    index: BTreeMap<u32, usize>,
}

impl QuestionSet {
    /// 由题目列表构造，题号必须唯一且 ≥ 1
    pub fn new(mut questions: Vec<Question>) -> Result<Self> {
        questions.sort_by_key(|q| q.qno);

        let mut index = BTreeMap::new();
        for (pos, q) in questions.iter().enumerate() {
            if q.qno == 0 {
                return Err(AppError::ExtractionFormat(
                    "question numbers start at 1".to_string(),
                ));
            }
            if index.insert(q.qno, pos).is_some() {
                return Err(AppError::ExtractionFormat(format!(
                    "duplicate question number {}",
                    q.qno
                )));
            }
        }

        Ok(Self { questions, index })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, qno: u32) -> Option<&Question> {
        self.index.get(&qno).map(|&pos| &self.questions[pos])
    }

    /// 需要配图的题号（升序）
    pub fn diagram_qnos(&self) -> impl Iterator<Item = u32> + '_ {
        self.questions
            .iter()
            .filter(|q| q.requires_diagram)
            .map(|q| q.qno)
    }

    /// 构建提交用的 JSON 数组 `[{qno, question}]`
    pub fn to_payload_json(&self) -> Result<String> {
        let payload: Vec<QuestionPayload<'_>> = self.questions.iter().map(Into::into).collect();
        Ok(serde_json::to_string(&payload)?)
    }
}

/// 科目 + 考试类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamMeta {
    pub subject: String,
    pub exam_type: String,
}

impl ExamMeta {
    pub fn new(subject: impl Into<String>, exam_type: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            exam_type: exam_type.into(),
        }
    }

    /// 科目和考试类型都不能为空
    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(AppError::Validation("Subject is required.".to_string()));
        }
        if self.exam_type.trim().is_empty() {
            return Err(AppError::Validation("Exam type is required.".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for ExamMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subject, self.exam_type)
    }
}
