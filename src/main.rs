use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notesearch::config::{SearchConfig, current_user};
use notesearch::search::SearchEngine;
use notesearch::utils::{ensure_database_directory, get_database_path};
use notesearch::{
    Database, FeedbackError, ListNotesOptions, NewNote, NoteId, NoteService, SortOrder, UserId,
};
use tracing_subscriber::EnvFilter;

/// notes - keep notes and find them again by meaning
#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Take notes and search them with synonym-aware ranking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Add a new note
    Add(AddCommand),
    /// Show one note, optionally highlighting a query
    Show(ShowCommand),
    /// List notes, newest first
    List(ListCommand),
    /// Search notes
    Search(SearchCommand),
    /// Leave feedback on a search query
    Feedback(FeedbackCommand),
    /// Delete a note
    Delete(DeleteCommand),
}

#[derive(Parser)]
struct AddCommand {
    /// The content of the note
    #[arg(value_name = "CONTENT")]
    content: String,

    /// Title of the note
    #[arg(short, long)]
    title: String,

    /// Category of the note
    #[arg(short, long)]
    category: Option<String>,
}

#[derive(Parser)]
struct ShowCommand {
    /// ID of the note
    id: i64,

    /// Highlight the terms of this query
    #[arg(short, long)]
    query: Option<String>,
}

#[derive(Parser)]
struct ListCommand {
    /// Maximum number of notes to show
    #[arg(short, long)]
    limit: Option<usize>,

    /// Only notes in this category
    #[arg(short, long)]
    category: Option<String>,

    /// Oldest first
    #[arg(long)]
    asc: bool,
}

#[derive(Parser)]
struct SearchCommand {
    /// Search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct FeedbackCommand {
    /// The query the feedback is about
    query: String,

    /// Feedback text
    text: String,

    /// Refuse to replace earlier feedback for the same query
    #[arg(long)]
    once: bool,
}

#[derive(Parser)]
struct DeleteCommand {
    /// ID of the note
    id: i64,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = open_service().and_then(|service| {
        let user = current_user();
        match &cli.command {
            Commands::Add(cmd) => execute_add(&service, cmd, user),
            Commands::Show(cmd) => execute_show(&service, cmd),
            Commands::List(cmd) => execute_list(&service, cmd),
            Commands::Search(cmd) => execute_search(&service, cmd),
            Commands::Feedback(cmd) => execute_feedback(&service, cmd, user),
            Commands::Delete(cmd) => execute_delete(&service, cmd),
        }
    });

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        tracing::debug!(error = ?e, exit_code, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are validation failures, missing notes and refused feedback.
/// Everything else, such as database or I/O failures, is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    if error.downcast_ref::<FeedbackError>().is_some() {
        return true;
    }
    let error_msg = error.to_string();
    error_msg.contains("cannot be empty") || error_msg.contains("not found")
}

fn open_service() -> Result<NoteService> {
    let db_path = get_database_path()?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    Ok(NoteService::new(db))
}

fn build_engine() -> Result<SearchEngine> {
    SearchEngine::from_config(&SearchConfig::from_env()).context("Failed to load thesaurus")
}

fn execute_add(service: &NoteService, cmd: &AddCommand, user: UserId) -> Result<()> {
    let mut draft = NewNote::new(&cmd.title, &cmd.content, user);
    if let Some(category) = &cmd.category {
        draft = draft.with_category(category);
    }

    let note = service.create_note(&draft)?;
    println!("Note created (id: {})", note.id());
    Ok(())
}

fn execute_show(service: &NoteService, cmd: &ShowCommand) -> Result<()> {
    let id = NoteId::new(cmd.id);
    let note = service
        .get_note(id)?
        .ok_or_else(|| anyhow::anyhow!("Note {id} not found"))?;

    match cmd.query.as_deref().filter(|q| !q.trim().is_empty()) {
        Some(query) => {
            let (title, content) = build_engine()?.highlight_note(&note, query)?;
            println!("{title}");
            println!("{content}");
        }
        None => {
            println!("{}", note.title());
            println!("{}", note.content());
        }
    }
    println!("[{}] created {}", note.category(), format_date(note.created_at()));
    Ok(())
}

fn execute_list(service: &NoteService, cmd: &ListCommand) -> Result<()> {
    let notes = service.list_notes(ListNotesOptions {
        limit: cmd.limit,
        category: cmd.category.clone(),
        owner: None,
        order: if cmd.asc {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        },
    })?;

    if notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }
    for note in &notes {
        println!(
            "{:>4}  {}  [{}]  {}",
            note.id(),
            format_date(note.created_at()),
            note.category(),
            note.title()
        );
    }
    Ok(())
}

fn execute_search(service: &NoteService, cmd: &SearchCommand) -> Result<()> {
    let engine = build_engine()?;
    let hits = service.search_notes(&engine, &cmd.query)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No matching notes.");
        return Ok(());
    }
    for hit in &hits {
        println!(
            "{:>4}  {:.3}  {}",
            hit.note.id(),
            hit.similarity_score,
            hit.highlighted_title
        );
        println!("      {}", hit.highlighted_content);
    }
    Ok(())
}

fn execute_feedback(service: &NoteService, cmd: &FeedbackCommand, user: UserId) -> Result<()> {
    if cmd.once {
        service.submit_feedback(user, &cmd.query, &cmd.text)?;
    } else {
        service.upsert_feedback(user, &cmd.query, &cmd.text)?;
    }
    println!("Feedback saved for '{}'", cmd.query);
    Ok(())
}

fn execute_delete(service: &NoteService, cmd: &DeleteCommand) -> Result<()> {
    service.delete_note(NoteId::new(cmd.id))?;
    println!("Note {} deleted", cmd.id);
    Ok(())
}

fn format_date(at: time::OffsetDateTime) -> String {
    format!("{:04}-{:02}-{:02}", at.year(), u8::from(at.month()), at.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> NoteService {
        NoteService::new(Database::in_memory().expect("failed to create in-memory database"))
    }

    #[test]
    fn add_rejects_empty_content_as_user_error() {
        let cmd = AddCommand {
            content: "   \n\t  ".to_string(),
            title: "Title".to_string(),
            category: None,
        };
        let err = execute_add(&service(), &cmd, UserId::new(1)).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
        assert!(is_user_error(&err));
    }

    #[test]
    fn add_stores_category() {
        let service = service();
        let cmd = AddCommand {
            content: "Buy eggs".to_string(),
            title: "Groceries".to_string(),
            category: Some("home".to_string()),
        };
        execute_add(&service, &cmd, UserId::new(1)).unwrap();

        let notes = service.list_notes(ListNotesOptions::default()).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].category(), "home");
    }

    #[test]
    fn show_missing_note_is_user_error() {
        let cmd = ShowCommand {
            id: 99,
            query: None,
        };
        let err = execute_show(&service(), &cmd).unwrap_err();
        assert!(is_user_error(&err));
    }

    #[test]
    fn duplicate_feedback_is_user_error() {
        let service = service();
        let cmd = FeedbackCommand {
            query: "dog".to_string(),
            text: "helpful".to_string(),
            once: true,
        };
        execute_feedback(&service, &cmd, UserId::new(1)).unwrap();

        let err = execute_feedback(&service, &cmd, UserId::new(1)).unwrap_err();
        assert!(is_user_error(&err));
    }

    #[test]
    fn repeated_feedback_without_once_replaces_text() {
        let service = service();
        for text in ["first", "second"] {
            let cmd = FeedbackCommand {
                query: "dog".to_string(),
                text: text.to_string(),
                once: false,
            };
            execute_feedback(&service, &cmd, UserId::new(1)).unwrap();
        }

        let fb = service.get_feedback(UserId::new(1), "dog").unwrap().unwrap();
        assert_eq!(fb.feedback(), "second");
    }

    #[test]
    fn database_errors_are_internal() {
        let err = anyhow::anyhow!("disk I/O error");
        assert!(!is_user_error(&err));
    }

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from(["notes", "search", "dog training", "--json"]).unwrap();
        match cli.command {
            Commands::Search(cmd) => {
                assert_eq!(cmd.query, "dog training");
                assert!(cmd.json);
            }
            _ => panic!("expected search command"),
        }
    }
}
