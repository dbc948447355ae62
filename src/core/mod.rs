pub mod book_store;
pub mod codec;
pub mod collection;
pub mod store;
pub mod user_service;

pub use crate::domain::model::{Book, Decoded, FieldIssue, Loaded, ParsePolicy, User};
pub use crate::domain::ports::Record;
pub use crate::utils::error::Result;
