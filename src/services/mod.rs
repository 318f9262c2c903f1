pub mod assessment_store;
pub mod attempt_counter;
pub mod authoring_service;
pub mod grading_service;
pub mod http_store;
