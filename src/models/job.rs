use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::question::ExamMeta;

/// 老师端的一次任务：一张试卷图片 + 可选的配图与答题卡
///
/// ```toml
/// paper_image = "scans/physics_cie1.jpg"
/// num_questions = 5
/// subject = "Physics"
/// exam_type = "CIE1"
///
/// [diagrams]
/// 3 = "scans/q3_circuit.png"
///
/// [answers]
/// usn = "1RV22CS001"
/// images = ["scans/ans_p1.jpg", "scans/ans_p2.jpg"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorJob {
    pub paper_image: PathBuf,
    pub num_questions: u32,
    pub subject: String,
    pub exam_type: String,
    /// 题号 → 配图路径（TOML 的键只能是字符串）
    #[serde(default)]
    pub diagrams: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub answers: Option<AnswerBatch>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

/// 一名学生的答题卡
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerBatch {
    pub usn: String,
    pub images: Vec<PathBuf>,
}

impl InstructorJob {
    pub fn meta(&self) -> ExamMeta {
        ExamMeta::new(self.subject.clone(), self.exam_type.clone())
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
