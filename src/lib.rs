pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use crate::core::{
    book_store::{BookSortKey, BookStore},
    store::StoreOptions,
    user_service::UserService,
};
pub use crate::domain::model::{Book, ParsePolicy, User};
pub use crate::utils::error::{CatalogError, Result};
