mod compiler;
mod service;

pub use compiler::{ResultRecord, compile_score_record, running_score, session_results};
pub use service::ScoreService;
