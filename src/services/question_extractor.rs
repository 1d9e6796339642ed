//! 题目抽取服务 - 业务能力层
//!
//! 把试卷图片交给视觉模型，再把回复解析成按题号排序的题目列表。
//!
//! 解析规则：
//! 1. 取回复中第一个 `{` 到最后一个 `}` 之间的内容，按 JSON 解析
//! 2. 必须是对象，键是 ≥ 1 的整数题号，值是字符串（只有配图标记时题干可以为空）
//! 3. 题干中出现配图标记（不区分大小写）即视为需要配图，并去掉标记

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::infrastructure::ImageEncoder;
use crate::models::{ExamMeta, ImageFile, Question, QuestionSet};
use crate::services::llm_service::VisionChat;
use crate::utils::logging::truncate_text;

/// 一次抽取请求
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub paper: ImageFile,
    pub num_questions: u32,
    pub meta: ExamMeta,
}

impl ExtractionRequest {
    pub fn new(paper: ImageFile, num_questions: u32, meta: ExamMeta) -> Self {
        Self {
            paper,
            num_questions,
            meta,
        }
    }

    /// 发请求前的校验
    pub fn validate(&self) -> Result<()> {
        self.meta.validate()?;
        if self.num_questions == 0 {
            return Err(AppError::Validation(
                "Number of questions must be at least 1.".to_string(),
            ));
        }
        if self.paper.is_empty() {
            return Err(AppError::Validation(
                "Question paper image is empty.".to_string(),
            ));
        }
        Ok(())
    }
}

/// 题目抽取服务
///
/// 职责：
/// - 构建提示词并调用视觉模型
/// - 解析回复并判断每道题是否需要配图
/// - 不持有流程状态
pub struct QuestionExtractor<V> {
    vision: V,
}

impl<V: VisionChat> QuestionExtractor<V> {
    pub fn new(vision: V) -> Self {
        Self { vision }
    }

    /// 抽取题目
    ///
    /// 网络、状态码和解析错误都原样返回，不做重试
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<QuestionSet> {
        request.validate()?;

        let data_url = ImageEncoder::to_data_url(&request.paper);
        debug!(
            "[{}] 试卷图片编码完成，data URL 长度: {}",
            request.meta,
            data_url.len()
        );

        let instruction = build_instruction(request.num_questions, &request.meta);
        let user_message = build_user_message(&request.meta);

        let reply = self
            .vision
            .ask_with_image(&instruction, &user_message, &data_url)
            .await?;

        debug!("[{}] 抽取服务回复: {}", request.meta, truncate_text(&reply, 200));

        let questions = parse_extraction_reply(&reply)?;

        info!(
            "[{}] ✓ 抽取到 {} 道题，其中 {} 道需要配图",
            request.meta,
            questions.len(),
            questions.diagram_qnos().count()
        );

        Ok(questions)
    }
}

/// 构建给抽取服务的系统提示
pub fn build_instruction(num_questions: u32, meta: &ExamMeta) -> String {
    format!(
        "You are an expert in extracting questions from question papers.\n\
         Please extract {} questions from the following image of a {} {} paper.\n\
         Return the result as a JSON object where the keys are question numbers and values are the question text.\n\
         For questions that mention diagrams or appear to require diagrams, please add \"{}\" at the end.",
        num_questions,
        meta.subject,
        meta.exam_type,
        crate::models::DIAGRAM_MARKER
    )
}

/// 构建随图片一起发送的用户消息
pub fn build_user_message(meta: &ExamMeta) -> String {
    format!(
        "This is a {} {} question paper.",
        meta.subject, meta.exam_type
    )
}

/// 解析抽取服务的回复
pub fn parse_extraction_reply(reply: &str) -> Result<QuestionSet> {
    let span = find_json_object_span(reply).ok_or_else(|| {
        AppError::ExtractionFormat("no JSON object found in the reply".to_string())
    })?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| AppError::ExtractionFormat(format!("embedded JSON is malformed: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        AppError::ExtractionFormat("embedded JSON is not an object".to_string())
    })?;

    let mut questions = Vec::with_capacity(object.len());
    for (key, raw_text) in object {
        let qno = parse_qno(key)?;
        let raw_text = raw_text.as_str().ok_or_else(|| {
            AppError::ExtractionFormat(format!("question {} is not a string", key))
        })?;

        let requires_diagram = has_diagram_marker(raw_text);
        let text = strip_diagram_marker(raw_text);
        if text.is_empty() {
            debug!("题 {} 没有题干文字，保留为空", qno);
        }

        questions.push(Question {
            qno,
            text,
            requires_diagram,
        });
    }

    if questions.is_empty() {
        return Err(AppError::EmptyExtraction);
    }

    QuestionSet::new(questions)
}

/// 第一个 `{` 到最后一个 `}`（贪婪匹配）
fn find_json_object_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn parse_qno(key: &str) -> Result<u32> {
    match key.trim().parse::<u32>() {
        Ok(qno) if qno >= 1 => Ok(qno),
        _ => Err(AppError::ExtractionFormat(format!(
            "'{}' is not a valid question number",
            key
        ))),
    }
}

fn diagram_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("(?i){}", regex::escape(crate::models::DIAGRAM_MARKER)))
            .expect("diagram marker pattern is valid")
    })
}

fn marker_with_whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\s*{}\s*",
            regex::escape(crate::models::DIAGRAM_MARKER)
        ))
        .expect("diagram marker pattern is valid")
    })
}

/// 是否包含配图标记（不区分大小写）
pub fn has_diagram_marker(text: &str) -> bool {
    diagram_marker_regex().is_match(text)
}

/// 去掉所有配图标记及其两侧空白
pub fn strip_diagram_marker(text: &str) -> String {
    marker_with_whitespace_regex()
        .replace_all(text, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_surrounding_prose() {
        let reply = r#"Sure! Here are the questions:
{
  "1": "Define Ohm's law.",
  "2": "Explain the working of a transformer (requires diagram)",
  "3": "State Kirchhoff's laws."
}
Let me know if you need anything else."#;

        let set = parse_extraction_reply(reply).unwrap();

        assert_eq!(set.len(), 3);
        let q2 = set.get(2).unwrap();
        assert!(q2.requires_diagram);
        assert_eq!(q2.text, "Explain the working of a transformer");
        assert!(!set.get(1).unwrap().requires_diagram);
        assert_eq!(set.diagram_qnos().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_marker_is_case_insensitive_and_fully_removed() {
        let set = parse_extraction_reply(
            r#"{"1": "Draw the ER model (REQUIRES DIAGRAM)", "2": "Sketch (Requires Diagram) the graph"}"#,
        )
        .unwrap();

        for q in set.iter() {
            assert!(q.requires_diagram);
            assert!(!q.text.to_lowercase().contains("requires diagram"));
        }
        assert_eq!(set.get(1).unwrap().text, "Draw the ER model");
        assert_eq!(set.get(2).unwrap().text, "Sketch the graph");
    }

    #[test]
    fn test_strip_then_detect_is_stable() {
        let stripped = strip_diagram_marker("Explain X (requires diagram)");
        assert_eq!(stripped, "Explain X");
        assert!(!has_diagram_marker(&stripped));
        assert_eq!(strip_diagram_marker("Explain X"), "Explain X");
    }

    #[test]
    fn test_questions_are_ordered_numerically() {
        let set = parse_extraction_reply(r#"{"10": "ten", "2": "two", "1": "one"}"#).unwrap();
        let qnos: Vec<u32> = set.iter().map(|q| q.qno).collect();
        assert_eq!(qnos, vec![1, 2, 10]);
    }

    #[test]
    fn test_no_object_is_format_error() {
        assert!(matches!(
            parse_extraction_reply("I could not read the paper."),
            Err(AppError::ExtractionFormat(_))
        ));
        assert!(matches!(
            parse_extraction_reply("} backwards {"),
            Err(AppError::ExtractionFormat(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_format_error() {
        assert!(matches!(
            parse_extraction_reply(r#"{"1": "unterminated}"#),
            Err(AppError::ExtractionFormat(_))
        ));
    }

    #[test]
    fn test_empty_object_is_empty_extraction() {
        assert!(matches!(
            parse_extraction_reply("Here you go: {}"),
            Err(AppError::EmptyExtraction)
        ));
    }

    #[test]
    fn test_schema_violations_are_rejected() {
        // 值不是字符串
        assert!(matches!(
            parse_extraction_reply(r#"{"1": 42}"#),
            Err(AppError::ExtractionFormat(_))
        ));
        // 键不是题号
        assert!(matches!(
            parse_extraction_reply(r#"{"Q1": "text"}"#),
            Err(AppError::ExtractionFormat(_))
        ));
        assert!(matches!(
            parse_extraction_reply(r#"{"0": "text"}"#),
            Err(AppError::ExtractionFormat(_))
        ));
        // 顶层是数组
        assert!(matches!(
            parse_extraction_reply(r#"[{"1": "text"}]"#),
            Err(AppError::ExtractionFormat(_))
        ));
        // "1" 与 "01" 指向同一题号
        assert!(matches!(
            parse_extraction_reply(r#"{"1": "a", "01": "b"}"#),
            Err(AppError::ExtractionFormat(_))
        ));
    }

    #[test]
    fn test_empty_and_marker_only_values_are_kept() {
        let set = parse_extraction_reply(r#"{"1": "Define entropy", "2": ""}"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(2).unwrap().text, "");
        assert!(!set.get(2).unwrap().requires_diagram);

        let set =
            parse_extraction_reply(r#"{"1": "Define entropy", "2": "(requires diagram)"}"#).unwrap();
        assert_eq!(set.len(), 2);
        let q2 = set.get(2).unwrap();
        assert_eq!(q2.text, "");
        assert!(q2.requires_diagram);
        assert_eq!(set.diagram_qnos().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_instruction_mentions_count_and_marker() {
        let meta = ExamMeta::new("Physics", "CIE1");
        let instruction = build_instruction(7, &meta);
        assert!(instruction.contains("extract 7 questions"));
        assert!(instruction.contains("Physics CIE1 paper"));
        assert!(instruction.contains("(requires diagram)"));
        assert_eq!(
            build_user_message(&meta),
            "This is a Physics CIE1 question paper."
        );
    }

    struct CannedVision(&'static str);

    impl VisionChat for CannedVision {
        async fn ask_with_image(&self, system: &str, _user: &str, image: &str) -> Result<String> {
            assert!(system.contains("extract 2 questions"));
            assert!(image.starts_with("data:image/png;base64,"));
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_extract_uses_vision_reply() {
        let extractor = QuestionExtractor::new(CannedVision(
            r#"{"1": "Define entropy", "2": "Draw a Carnot cycle (requires diagram)"}"#,
        ));
        let request = ExtractionRequest::new(
            ImageFile::new("paper.png", vec![1, 2, 3]),
            2,
            ExamMeta::new("Thermo", "SEE"),
        );

        let set = extractor.extract(&request).await.unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get(2).unwrap().requires_diagram);
    }

    #[tokio::test]
    async fn test_extract_validates_before_calling_service() {
        let extractor = QuestionExtractor::new(CannedVision("{}"));
        let request = ExtractionRequest::new(
            ImageFile::new("paper.png", vec![1]),
            0,
            ExamMeta::new("Thermo", "SEE"),
        );
        assert!(matches!(
            extractor.extract(&request).await,
            Err(AppError::Validation(_))
        ));
    }
}
