pub mod completion;
pub mod consumer;
pub mod metrics;
pub mod publisher;
pub mod rules;
pub mod validator;
