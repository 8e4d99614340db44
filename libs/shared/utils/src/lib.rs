pub mod id;
pub mod test_utils;

pub use id::{IdGenerator, UuidIdGenerator};
