use serde::{Deserialize, Serialize};

/// 每道题的满分（当前后端约定为固定值）
pub const MAX_SCORE_PER_QUESTION: u32 = 10;

/// 一道题的评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub question: String,
    pub score: f64,
    pub feedback: String,
}

/// `forwarded_response` 字符串解析后的结构
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardedEvaluation {
    pub results: Vec<EvaluationResult>,
}
