pub mod consumer;
pub mod country;
pub mod processor;
pub mod rules;
