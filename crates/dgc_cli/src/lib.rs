//! Administrative command line for the manuals store.
//!
//! # Responsibility
//! - Seed and maintain manuals outside the HTTP surface.
//! - Inspect the recommended rotation for an arbitrary date.
//! - Manage device-local notes.
//!
//! Commands write human-readable lines or pretty JSON to the provided sink so
//! they can be exercised without a terminal.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use dgc_core::db::{close_db, open_db, DbError};
use dgc_core::{
    core_version, ping, ManualService, ManualServiceError, Month, NewManual, NoteId,
    NoteService, NoteServiceError, RepoError, SqliteManualRepository, SqliteNoteRepository,
};
use log::{info, warn};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "dgc", version, about = "Manuals store administration", long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "DGC_DB_PATH", default_value = "dgc.sqlite3")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print core linkage information
    Ping,
    /// Insert manuals from a JSON array file
    Seed {
        file: PathBuf,
        /// Delete every stored manual before inserting
        #[arg(long)]
        clear: bool,
    },
    /// Set the image of the manual filed under a month and order
    SetImage {
        #[arg(long, value_parser = parse_month)]
        month: Month,
        #[arg(long)]
        order: i64,
        #[arg(long)]
        url: String,
    },
    /// Delete every stored manual
    Clear,
    /// Show the recommended shortlist
    Recommended {
        /// Rotation date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Manage notes
    #[command(subcommand)]
    Notes(NotesCommand),
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List notes in creation order
    List,
    /// Create a note, or overwrite one when `--id` is given
    Save {
        #[arg(long)]
        id: Option<NoteId>,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Delete a note
    Delete { id: NoteId },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("{0}")]
    Manual(#[from] ManualServiceError),

    #[error("{0}")]
    Note(#[from] NoteServiceError),

    #[error("{0}")]
    Repo(#[from] RepoError),

    #[error("cannot read seed file {path}: {source}")]
    SeedFile { path: PathBuf, source: io::Error },

    #[error("invalid seed file {path}: {source}")]
    SeedFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("output failed: {0}")]
    Io(#[from] io::Error),

    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_month(raw: &str) -> Result<Month, String> {
    Month::normalize(raw).ok_or_else(|| format!("`{raw}` is not a month name"))
}

/// Opens the store named by `cli.db`, runs the command, then closes the store.
/// `ping` never touches the store.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    if let Command::Ping = cli.command {
        return print_ping(out);
    }

    let conn = open_db(&cli.db)?;
    let result = execute(cli.command, &conn, out);
    close_db(conn)?;
    result
}

/// Runs one command against an already opened store.
pub fn execute(command: Command, conn: &Connection, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::Ping => print_ping(out)?,
        Command::Seed { file, clear } => seed(conn, &file, clear, out)?,
        Command::SetImage { month, order, url } => {
            let manuals = ManualService::new(SqliteManualRepository::try_new(conn)?);
            let updated = manuals.set_image_url(month, order, url)?;
            writeln!(
                out,
                "updated {} week {} ({}) image={}",
                updated.month,
                updated.order,
                updated.id,
                updated.image_url.as_deref().unwrap_or("")
            )?;
        }
        Command::Clear => {
            let manuals = ManualService::new(SqliteManualRepository::try_new(conn)?);
            let deleted = manuals.clear_all()?;
            writeln!(out, "Deleted {deleted} manuals")?;
        }
        Command::Recommended { date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let manuals = ManualService::new(SqliteManualRepository::try_new(conn)?);
            let recommendation = manuals.recommended(today)?;
            serde_json::to_writer_pretty(&mut *out, &recommendation)?;
            writeln!(out)?;
        }
        Command::Notes(notes) => run_notes(notes, conn, out)?,
    }
    Ok(())
}

fn print_ping(out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "dgc_core ping={}", ping())?;
    writeln!(out, "dgc_core version={}", core_version())?;
    Ok(())
}

fn seed(conn: &Connection, file: &Path, clear: bool, out: &mut impl Write) -> Result<(), CliError> {
    let reader = File::open(file).map_err(|source| CliError::SeedFile {
        path: file.to_path_buf(),
        source,
    })?;
    let batch: Vec<NewManual> =
        serde_json::from_reader(BufReader::new(reader)).map_err(|source| CliError::SeedFormat {
            path: file.to_path_buf(),
            source,
        })?;

    let manuals = ManualService::new(SqliteManualRepository::try_new(conn)?);
    let existing = manuals.count()?;
    if existing > 0 {
        if clear {
            let deleted = manuals.clear_all()?;
            writeln!(out, "Cleared {deleted} existing manuals")?;
        } else {
            warn!("event=seed module=cli status=existing count={existing}");
            writeln!(
                out,
                "Found {existing} existing manuals; adding without clearing (pass --clear to replace them)"
            )?;
        }
    }

    // Rows land one at a time; a failure leaves earlier rows in place.
    let total = batch.len();
    for input in batch {
        let manual = manuals.create_manual(input)?;
        writeln!(
            out,
            "  Week {} ({}): {}",
            manual.week.map(|week| week.to_string()).unwrap_or_else(|| "-".into()),
            manual.month,
            manual.title
        )?;
    }

    info!("event=seed module=cli status=ok inserted={total}");
    writeln!(out, "Created {total} manuals")?;
    Ok(())
}

fn run_notes(command: NotesCommand, conn: &Connection, out: &mut impl Write) -> Result<(), CliError> {
    let notes = NoteService::new(SqliteNoteRepository::try_new(conn)?);
    match command {
        NotesCommand::List => {
            serde_json::to_writer_pretty(&mut *out, &notes.list_notes()?)?;
            writeln!(out)?;
        }
        NotesCommand::Save { id, title, content } => {
            let today = Local::now().date_naive();
            match notes.autosave(id, title, content, today)? {
                Some(note) => writeln!(out, "saved {}", note.id)?,
                None => writeln!(out, "nothing saved: title is blank")?,
            }
        }
        NotesCommand::Delete { id } => {
            notes.delete_note(id)?;
            writeln!(out, "deleted {id}")?;
        }
    }
    Ok(())
}
