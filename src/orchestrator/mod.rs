//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是整个系统的"指挥中心"：读任务、串联各流程、把错误转换成面向用户的提示。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 老师端任务：抽取 → 配图 → 提交 → 评分
//! - 单独评分（科目/考试类型可从阶段交接文件补全）
//! - 学生端：科目列表、反馈报告
//!
//! ### `report` - 结果输出
//! - 题目列表、评分结果、学生反馈的日志输出
//!
//! ## 层次关系
//!
//! ```text
//! app (一次任务)
//!     ↓
//! workflow::ExamWorkflow / EvaluationFlow (流程状态)
//!     ↓
//! services (能力层：extract / gate / submit / evaluate / feedback)
//!     ↓
//! clients + infrastructure (评分后端、抽取服务、文件)
//! ```

pub mod app;
pub mod report;

pub use app::{App, JobOutcome};
