pub mod flexible;
pub mod time;
pub mod validation;
