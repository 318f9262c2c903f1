pub mod controller;
pub mod navigator;
pub mod scheduler;

pub use controller::AssessmentSession;
pub use navigator::QuestionNavigator;
pub use scheduler::{ManualScheduler, Scheduler, TimerId, TokioScheduler};
