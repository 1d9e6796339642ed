//! # Paper Grader
//!
//! 试卷出题与答题卡评分的客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 图片读取与编码、HTTP 客户端、阶段交接文件
//! - `clients/` - 评分后端的四个接口（提交题目、评分、反馈、科目）
//!
//! ### ② 业务能力层（Services）
//! - `LlmService` / `QuestionExtractor` - 从试卷图片抽取题目
//! - `DiagramGate` - 需要配图的题是否都已上传
//! - `QuestionSetSubmitter` - 提交题目集合
//! - `AnswerEvaluator` - 评分答题卡并解包两层 JSON
//! - `score_aggregator` - 分数汇总与分档
//! - `FeedbackReader` - 学生端只读查询
//!
//! ### ③ 流程层（Workflow）
//! - `ExamWorkflow` - 上传 → 审核 → 提交的状态机
//! - `EvaluationFlow` - 评分一名学生的答题卡
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 老师端任务、单独评分、学生端查询
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::GraderClient;
pub use config::Config;
pub use error::{AppError, Result, WorkflowStep};
pub use models::{EvaluationResult, ExamMeta, FeedbackEntry, ImageFile, Question, QuestionSet};
pub use orchestrator::{App, JobOutcome};
pub use services::{DiagramGate, VisionChat};
pub use workflow::{EvaluationFlow, EvaluationSummary, ExamWorkflow, ExamWorkflowState};
