//! 出卷流程 - 流程层
//!
//! 核心职责：维护"上传试卷 → 审核题目 → 提交"这一条流程的状态
//!
//! 状态只有两种：
//! 1. `Upload` - 还没有题目，可以发起抽取
//! 2. `Review` - 已抽取出题目，可以上传配图、提交，或重置回 `Upload`
//!
//! 重置会让在途请求的结果作废：请求回来时发现代数变了，返回 `Superseded`，不改状态

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::infrastructure::HandoffStore;
use crate::models::{ExamMeta, ImageFile, QuestionSet};
use crate::services::{
    DiagramGate, ExtractionRequest, QuestionExtractor, QuestionSetSubmitter, VisionChat,
};
use crate::workflow::loading::LoadingFlag;

/// 审核阶段的会话数据
#[derive(Debug, Clone)]
pub struct ReviewSession {
    pub meta: ExamMeta,
    pub questions: QuestionSet,
    pub gate: DiagramGate,
}

/// 出卷流程状态
#[derive(Debug, Clone, Default)]
pub enum ExamWorkflowState {
    #[default]
    Upload,
    Review(ReviewSession),
}

impl ExamWorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            ExamWorkflowState::Upload => "upload",
            ExamWorkflowState::Review(_) => "review",
        }
    }
}

/// 出卷流程
///
/// - 持有流程状态、加载标记和代数
/// - 只依赖业务能力（services）
/// - 状态锁从不跨 await 持有
pub struct ExamWorkflow<V> {
    extractor: QuestionExtractor<V>,
    submitter: QuestionSetSubmitter,
    handoff: HandoffStore,
    state: Mutex<ExamWorkflowState>,
    loading: LoadingFlag,
    generation: AtomicU64,
}

impl<V: VisionChat> ExamWorkflow<V> {
    pub fn new(
        extractor: QuestionExtractor<V>,
        submitter: QuestionSetSubmitter,
        handoff: HandoffStore,
    ) -> Self {
        Self {
            extractor,
            submitter,
            handoff,
            state: Mutex::new(ExamWorkflowState::Upload),
            loading: LoadingFlag::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// 从试卷图片抽取题目，成功后进入 `Review`
    ///
    /// 失败时停留在 `Upload`
    pub async fn extract(&self, request: ExtractionRequest) -> Result<QuestionSet> {
        let _loading = self.loading.try_begin()?;

        if let ExamWorkflowState::Review(_) = &*self.lock_state() {
            return Err(AppError::InvalidState(
                "Questions already extracted; reset before uploading a new paper.".to_string(),
            ));
        }

        let generation = self.current_generation();
        let questions = self.extractor.extract(&request).await?;

        let mut state = self.lock_state();
        if self.current_generation() != generation {
            warn!("[试卷 {}] 抽取结果到达前流程已重置，丢弃", request.meta);
            return Err(AppError::Superseded);
        }

        *state = ExamWorkflowState::Review(ReviewSession {
            meta: request.meta,
            gate: DiagramGate::for_questions(&questions),
            questions: questions.clone(),
        });

        Ok(questions)
    }

    /// 为需要配图的题上传图片（覆盖旧图）
    pub fn attach_diagram(&self, qno: u32, file: ImageFile) -> Result<()> {
        self.with_session(|session| {
            info!("[试卷 {}] 题 {} 上传配图 {}", session.meta, qno, file.file_name);
            session.gate.attach(qno, file)
        })
    }

    pub fn detach_diagram(&self, qno: u32) -> Result<()> {
        self.with_session(|session| session.gate.detach(qno))
    }

    /// `Upload` 状态下恒为 false
    pub fn is_submission_allowed(&self) -> bool {
        match &*self.lock_state() {
            ExamWorkflowState::Review(session) => session.gate.is_submission_allowed(),
            ExamWorkflowState::Upload => false,
        }
    }

    pub fn missing_diagrams(&self) -> Vec<u32> {
        match &*self.lock_state() {
            ExamWorkflowState::Review(session) => session.gate.missing(),
            ExamWorkflowState::Upload => Vec::new(),
        }
    }

    /// 当前状态的快照
    pub fn state(&self) -> ExamWorkflowState {
        self.lock_state().clone()
    }

    pub fn questions(&self) -> Option<QuestionSet> {
        match &*self.lock_state() {
            ExamWorkflowState::Review(session) => Some(session.questions.clone()),
            ExamWorkflowState::Upload => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// 回到 `Upload`，丢弃题目和配图，作废在途请求
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.lock_state() = ExamWorkflowState::Upload;
        info!("🔄 出卷流程已重置");
    }

    /// 提交题目和配图
    ///
    /// 成功后写入阶段交接文件并返回科目/考试类型，流程状态不变
    pub async fn submit(&self) -> Result<ExamMeta> {
        let _loading = self.loading.try_begin()?;

        let session = match &*self.lock_state() {
            ExamWorkflowState::Review(session) => session.clone(),
            ExamWorkflowState::Upload => {
                return Err(AppError::InvalidState(
                    "No questions to submit; extract a paper first.".to_string(),
                ))
            }
        };

        let generation = self.current_generation();
        self.submitter
            .submit(&session.questions, &session.gate, &session.meta)
            .await?;

        if self.current_generation() != generation {
            warn!("[试卷 {}] 提交完成前流程已重置，不写交接文件", session.meta);
            return Err(AppError::Superseded);
        }

        if let Err(e) = self.handoff.save(&session.meta).await {
            warn!(
                "[试卷 {}] ⚠️ 写入交接文件 {} 失败: {}",
                session.meta,
                self.handoff.path().display(),
                e
            );
        }

        Ok(session.meta)
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut ReviewSession) -> Result<T>) -> Result<T> {
        match &mut *self.lock_state() {
            ExamWorkflowState::Review(session) => f(session),
            ExamWorkflowState::Upload => Err(AppError::InvalidState(
                "No questions loaded; extract a paper first.".to_string(),
            )),
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> MutexGuard<'_, ExamWorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
