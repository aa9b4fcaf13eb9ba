//! bookcat - command line front end for the book catalog
//!
//! Each command drives the store the same way the catalog page does: load,
//! open the form, fill it in, validate, submit.

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use book_catalog::{
    config::{AppConfig, LoggingConfig},
    AppError, BookField, BookFields, BookId, BookRecord, HttpBookApi, HttpBookStore, ModalKind,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage a remote book catalog", long_about = None)]
struct Cli {
    /// Book service root URL (overrides configuration)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every book
    List,
    /// Show one book
    Show { id: BookId },
    /// Add a book
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "")]
        year: String,
    },
    /// Edit the given fields of a book
    Edit {
        id: BookId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Delete a book
    Delete { id: BookId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    init_tracing(&config.logging);
    tracing::debug!("Using book service at {}", config.api.base_url);

    let store = HttpBookStore::new(HttpBookApi::new(&config.api.base_url)?);

    match cli.command {
        Command::List => {
            store.load_all().await.or_else(|err| fail(&store, err))?;
            print_table(&store.snapshot().books);
        }
        Command::Show { id } => {
            let book = store.load_detail(id).await.or_else(|err| fail(&store, err))?;
            print_book(&book);
        }
        Command::Add { title, author, year } => {
            store.open_modal(ModalKind::Add, None);
            store.update_draft_field(BookField::Title, title);
            store.update_draft_field(BookField::Author, author);
            store.update_draft_field(BookField::Year, year);
            let book = store.create_record().await.or_else(|err| fail(&store, err))?;
            println!("Added book {}", book.id);
            print_book(&book);
        }
        Command::Edit {
            id,
            title,
            author,
            year,
        } => {
            store.load_all().await.or_else(|err| fail(&store, err))?;
            store.open_modal_for(ModalKind::Edit, id)?;
            let changes = [
                (BookField::Title, title),
                (BookField::Author, author),
                (BookField::Year, year),
            ];
            for (field, value) in changes {
                if let Some(value) = value {
                    store.update_selection_field(field, value);
                }
            }
            let book = store.update_record().await.or_else(|err| fail(&store, err))?;
            println!("Updated book {}", book.id);
            print_book(&book);
        }
        Command::Delete { id } => {
            store.load_all().await.or_else(|err| fail(&store, err))?;
            store.open_modal_for(ModalKind::Delete, id)?;
            store.delete_record().await.or_else(|err| fail(&store, err))?;
            println!("Deleted book {}", id);
        }
    }

    Ok(())
}

/// Report a failed operation the way the form would show it
fn fail<T>(store: &HttpBookStore, err: AppError) -> anyhow::Result<T> {
    if let AppError::Validation(errors) = &err {
        for (field, message) in errors.iter() {
            eprintln!("  {}: {}", field, message);
        }
        bail!("The book was not saved");
    }

    let snapshot = store.snapshot();
    match snapshot.error {
        Some(message) => bail!("{}", message),
        None => bail!(err),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("book_catalog={0},bookcat={0}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_table(books: &[BookRecord]) {
    if books.is_empty() {
        println!("No books in the catalog");
        return;
    }

    println!("{:>6}  {:<40}  {:<30}  {}", "ID", "TITLE", "AUTHOR", "YEAR");
    for book in books {
        println!(
            "{:>6}  {:<40}  {:<30}  {}",
            book.id, book.title, book.author, book.year
        );
    }
}

fn print_book(book: &BookRecord) {
    for field in BookField::ALL {
        println!("{:<7} {}", format!("{}:", field.label()), book.field(field));
    }
    println!("{:<7} {}", "SSID:", book.id);
}
