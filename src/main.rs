use anyhow::Context;
use catalog_store::config::cli::{BookCommand, Command, UserCommand};
use catalog_store::config::toml_config::TomlConfig;
use catalog_store::utils::error::ErrorCategory;
use catalog_store::utils::logger;
use catalog_store::utils::validation::{validate_non_empty_string, validate_record_text};
use catalog_store::{Book, BookStore, CatalogError, CliConfig, User, UserService};
use clap::Parser;
use serde_json::json;

fn main() {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    let level = config.logging.level.as_deref();
    if config.logging.format.as_deref() == Some("json") {
        logger::init_json_logger(level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli, &config) {
        tracing::error!("❌ {:#}", e);
        match e.downcast_ref::<CatalogError>() {
            Some(err) => {
                eprintln!("❌ {}", err.user_friendly_message());
                std::process::exit(exit_code(err));
            }
            None => {
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn exit_code(err: &CatalogError) -> i32 {
    match err.category() {
        ErrorCategory::Input => 2,
        ErrorCategory::Configuration => 3,
        ErrorCategory::Data => 4,
        ErrorCategory::Storage => 5,
    }
}

fn run(cli: &CliConfig, config: &TomlConfig) -> anyhow::Result<()> {
    let options = config.store_options();
    match &cli.command {
        Command::Books { action } => {
            let mut store = BookStore::open(&config.catalog.books_path, options)
                .with_context(|| format!("opening {}", config.catalog.books_path))?;
            report_issues(store.load_issues().len());
            let dirty = run_books(&mut store, action, cli.json)?;
            if dirty && !options.auto_persist {
                store.save()?;
            }
        }
        Command::Users { action } => {
            let mut service = UserService::open(&config.catalog.users_path, options)
                .with_context(|| format!("opening {}", config.catalog.users_path))?;
            report_issues(service.load_issues().len());
            let dirty = run_users(&mut service, action, cli.json)?;
            if dirty && !options.auto_persist {
                service.save()?;
            }
        }
    }
    Ok(())
}

fn report_issues(count: usize) {
    if count > 0 {
        eprintln!("⚠️  {} field(s) could not be parsed and were defaulted", count);
    }
}

/// Returns true when the store was mutated and still needs a save.
fn run_books(store: &mut BookStore, action: &BookCommand, as_json: bool) -> anyhow::Result<bool> {
    match action {
        BookCommand::List => print_books(store.list().iter(), as_json),
        BookCommand::Find { serial } => match store.find_by_serial(*serial) {
            Some(book) => print_books(std::iter::once(book), as_json),
            None => println!("No book with serial {}", serial),
        },
        BookCommand::Search { title, author } => {
            let hits: Vec<&Book> = match (title, author) {
                (Some(t), _) => store
                    .search_title(t)
                    .into_iter()
                    .filter(|b| {
                        author.as_ref().map_or(true, |a| {
                            b.author.to_lowercase().contains(&a.to_lowercase())
                        })
                    })
                    .collect(),
                (None, Some(a)) => store.search_author(a),
                (None, None) => store.list().iter().collect(),
            };
            print_books(hits.into_iter(), as_json);
        }
        BookCommand::Add {
            author,
            title,
            serial,
            checked_out,
        } => {
            validate_non_empty_string("title", title)?;
            validate_record_text("author", author)?;
            validate_record_text("title", title)?;
            if store.find_by_serial(*serial).is_some() {
                return Err(CatalogError::ValidationError {
                    message: format!("serial {} is already in the catalog", serial),
                }
                .into());
            }
            store.add(Book::new(author.as_str(), title.as_str(), *serial, *checked_out))?;
            println!("✅ Added '{}' ({})", title, serial);
        }
        BookCommand::Remove { serial } => {
            return Ok(match store.remove(*serial)? {
                Some(book) => {
                    println!("✅ Removed '{}' ({})", book.title, book.serial_number);
                    true
                }
                None => {
                    println!("No book with serial {}", serial);
                    false
                }
            });
        }
        BookCommand::Checkout { serial } => return set_flag(store, *serial, true),
        BookCommand::Return { serial } => return set_flag(store, *serial, false),
        BookCommand::Sort { by } => print_books(store.sorted_by(*by).iter(), as_json),
    }
    Ok(false)
}

fn set_flag(store: &mut BookStore, serial: i64, checked_out: bool) -> anyhow::Result<bool> {
    let Some(book) = store.find_by_serial(serial) else {
        println!("No book with serial {}", serial);
        return Ok(false);
    };
    if book.checked_out == checked_out {
        let state = if checked_out { "checked out" } else { "available" };
        println!("'{}' is already {}", book.title, state);
        return Ok(false);
    }
    store.set_checked_out(serial, checked_out)?;
    println!("✅ Updated {}", serial);
    Ok(true)
}

fn run_users(
    service: &mut UserService,
    action: &UserCommand,
    as_json: bool,
) -> anyhow::Result<bool> {
    match action {
        UserCommand::List => print_users(service.list().iter(), as_json),
        UserCommand::Find { name } => match service.find_by_name(name) {
            Some(user) => print_users(std::iter::once(user), as_json),
            None => println!("No user named '{}'", name),
        },
        UserCommand::Add {
            name,
            password,
            role,
        } => {
            check_user_input(name, password, role)?;
            let user = service.add_with_role(name, password, role)?;
            println!("✅ Added user '{}' with id {}", user.name, user.id);
        }
        UserCommand::Remove { id } => {
            return Ok(match service.remove(*id)? {
                Some(user) => {
                    println!("✅ Removed user '{}' ({})", user.name, user.id);
                    true
                }
                None => {
                    println!("No user with id {}", id);
                    false
                }
            });
        }
        UserCommand::Update {
            id,
            name,
            password,
            role,
        } => {
            check_user_input(name, password, role)?;
            return Ok(match service.update(*id, name, password, role)? {
                Some(previous) => {
                    println!("✅ Updated user {} (was '{}')", id, previous.name);
                    true
                }
                None => {
                    println!("No user with id {}", id);
                    false
                }
            });
        }
    }
    Ok(false)
}

fn check_user_input(name: &str, password: &str, role: &str) -> catalog_store::Result<()> {
    validate_non_empty_string("name", name)?;
    validate_non_empty_string("password", password)?;
    validate_record_text("name", name)?;
    validate_record_text("password", password)?;
    validate_record_text("role", role)?;
    Ok(())
}

fn print_books<'a>(books: impl Iterator<Item = &'a Book>, as_json: bool) {
    if as_json {
        let books: Vec<&Book> = books.collect();
        println!("{}", json!(books));
        return;
    }
    for book in books {
        let state = if book.checked_out { "checked out" } else { "available" };
        println!(
            "{:>6}  {} by {} [{}]",
            book.serial_number, book.title, book.author, state
        );
    }
}

// 不輸出密碼
fn print_users<'a>(users: impl Iterator<Item = &'a User>, as_json: bool) {
    if as_json {
        let users: Vec<_> = users
            .map(|u| json!({ "id": u.id, "name": u.name, "role": u.role }))
            .collect();
        println!("{}", json!(users));
        return;
    }
    for user in users {
        let tag = if user.is_librarian() { " (librarian)" } else { "" };
        println!("{:>4}  {}{}", user.id, user.name, tag);
    }
}
