use crate::core::book_store::BookSortKey;
use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Work with the book file
    Books {
        #[command(subcommand)]
        action: BookCommand,
    },
    /// Work with the user file
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BookCommand {
    List,
    Find {
        serial: i64,
    },
    /// Case-insensitive substring search
    Search {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    Add {
        author: String,
        title: String,
        serial: i64,
        #[arg(long)]
        checked_out: bool,
    },
    Remove {
        serial: i64,
    },
    Checkout {
        serial: i64,
    },
    Return {
        serial: i64,
    },
    /// Print the catalog sorted by title, author or serial
    Sort {
        #[arg(default_value = "title")]
        by: BookSortKey,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum UserCommand {
    List,
    Find {
        name: String,
    },
    Add {
        name: String,
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    Remove {
        id: i64,
    },
    Update {
        id: i64,
        name: String,
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
}
