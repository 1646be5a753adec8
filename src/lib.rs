pub mod core;
pub mod domain;
pub mod grading;
pub mod schemas;
pub mod services;

pub use crate::domain::answer_key::{split_storage_key, AnswerMap, SubKey};
pub use crate::domain::models::{ExamSession, OptionItem, Part, Question, TestDefinition};
pub use crate::domain::types::{ExamModule, QuestionKind, ScoringMode, SessionStatus};
pub use crate::grading::assembler::assemble;
pub use crate::grading::bands::{raw_to_band, table_for, BandTable};
pub use crate::grading::render::render_review;
pub use crate::grading::{GraderOutput, GradingAnomaly};
pub use crate::schemas::breakdown::{
    Breakdown, GradingRecord, PartBreakdown, QuestionBreakdown, SubQuestionResult,
};
pub use crate::schemas::review::{ReviewOption, ReviewPart, ReviewProjection, ReviewQuestion};
pub use crate::services::session_store::{
    InMemorySessionStore, SessionLock, SessionStore, StoreError,
};
pub use crate::services::submission_grading::grade_and_persist;
