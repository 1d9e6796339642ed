use serde::{Deserialize, Serialize};

/// 学生端查询到的一道题的反馈
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub qno: u32,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl FeedbackEntry {
    /// 缺失的得分按 0 计
    pub fn score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }
}

/// `GET /student/feedback/` 的响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub feedbacks: Vec<FeedbackEntry>,
}

/// 学生已登记的科目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub subject: String,
    #[serde(default, deserialize_with = "deserialize_sem")]
    pub sem: String,
    #[serde(rename = "paperTypes", default)]
    pub paper_types: Vec<String>,
}

/// `POST /student/subjects/` 的响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectsResponse {
    #[serde(rename = "subjectsData", default)]
    pub subjects_data: Vec<SubjectSummary>,
}

// 学期在库里可能存成字符串也可能是整数
fn deserialize_sem<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct SemVisitor;

    impl<'de> Visitor<'de> for SemVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer semester")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(SemVisitor)
}
