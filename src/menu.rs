//! The interactive menu hierarchy.
//!
//! Menus read from a [`LineSource`] and print to any writer. End of input at
//! any prompt leaves the whole shell.

use std::io::Write;
use std::path::Path;

use rusqlite::Connection;

use crate::config::UiConfig;
use crate::error::{Error, Result};
use crate::executor::ScriptRunner;
use crate::music::{self, Entity};
use crate::render::ResultTable;

/// Where menu input comes from.
pub trait LineSource {
    /// Shows `prompt` and reads one line; `None` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

impl<T: LineSource + ?Sized> LineSource for &mut T {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        (**self).read_line(prompt)
    }
}

type Options = &'static [(&'static str, &'static str)];

const MAIN_MENU: Options = &[
    ("1", "View Tables"),
    ("2", "Insert Data"),
    ("3", "Update Data"),
    ("4", "Delete Data"),
    ("5", "Transaction Demo"),
    ("6", "Call View / Stored Procedure"),
    ("7", "Run SQL Script"),
    ("999", "Reset Database"),
    ("0", "Exit"),
];

const VIEW_MENU: Options = &[
    ("1", "View Users"),
    ("2", "View Artists"),
    ("3", "View Songs"),
    ("0", "Return To Main Menu"),
];

const INSERT_MENU: Options = &[
    ("1", "Insert User"),
    ("2", "Insert Artist"),
    ("3", "Insert Song"),
    ("0", "Return To Main Menu"),
];

const UPDATE_MENU: Options = &[
    ("1", "Update User"),
    ("2", "Update Artist"),
    ("3", "Update Song TimesPlayed"),
    ("0", "Return To Main Menu"),
];

const DELETE_MENU: Options = &[
    ("1", "Delete User"),
    ("2", "Delete Artist"),
    ("3", "Delete Song"),
    ("0", "Return To Main Menu"),
];

const PROCEDURE_MENU: Options = &[
    ("1", "View (SELECT from VIEW)"),
    ("2", "Call Stored Procedure"),
    ("0", "Return To Main Menu"),
];

/// Why a menu stopped early.
enum Stop {
    /// Input ran out
    Exit,
    Failed(Error),
}

impl From<Error> for Stop {
    fn from(e: Error) -> Self {
        Stop::Failed(e)
    }
}

impl From<std::io::Error> for Stop {
    fn from(e: std::io::Error) -> Self {
        Stop::Failed(e.into())
    }
}

type Step<T = ()> = std::result::Result<T, Stop>;

pub struct Menu<'a, I, W> {
    conn: &'a mut Connection,
    input: I,
    out: W,
    ui: UiConfig,
}

impl<'a, I: LineSource, W: Write> Menu<'a, I, W> {
    pub fn new(conn: &'a mut Connection, input: I, out: W, ui: UiConfig) -> Self {
        Self {
            conn,
            input,
            out,
            ui,
        }
    }

    /// Runs the main menu until "Exit" or end of input.
    pub fn run(&mut self) -> Result<()> {
        match self.main_menu() {
            Ok(()) | Err(Stop::Exit) => Ok(()),
            Err(Stop::Failed(e)) => Err(e),
        }
    }

    fn main_menu(&mut self) -> Step {
        loop {
            match self.choose("MAIN MENU", MAIN_MENU)?.as_str() {
                "1" => self.view_menu()?,
                "2" => self.insert_menu()?,
                "3" => self.update_menu()?,
                "4" => self.delete_menu()?,
                "5" => self.transaction_demo()?,
                "6" => self.procedure_menu()?,
                "7" => self.run_script_file()?,
                "999" => self.reset_database()?,
                "0" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice.")?,
            }
        }
    }

    fn view_menu(&mut self) -> Step {
        loop {
            let entity = match self.choose("VIEW OPTIONS MENU", VIEW_MENU)?.as_str() {
                "1" => Entity::User,
                "2" => Entity::Artist,
                "3" => Entity::Song,
                "0" => return Ok(()),
                _ => {
                    writeln!(self.out, "Invalid option.")?;
                    continue;
                }
            };
            let table = music::view(self.conn, entity);
            self.show(table)?;
        }
    }

    fn insert_menu(&mut self) -> Step {
        loop {
            match self.choose("INSERT OPTIONS MENU", INSERT_MENU)?.as_str() {
                "1" => self.insert_user()?,
                "2" => self.insert_artist()?,
                "3" => self.insert_song()?,
                "0" => return Ok(()),
                _ => writeln!(self.out, "Invalid option.")?,
            }
        }
    }

    fn update_menu(&mut self) -> Step {
        loop {
            match self.choose("UPDATE OPTIONS MENU", UPDATE_MENU)?.as_str() {
                "1" => self.update_user()?,
                "2" => self.update_artist()?,
                "3" => self.update_song_times_played()?,
                "0" => return Ok(()),
                _ => writeln!(self.out, "Invalid option.")?,
            }
        }
    }

    fn delete_menu(&mut self) -> Step {
        loop {
            let entity = match self.choose("DELETE OPTIONS MENU", DELETE_MENU)?.as_str() {
                "1" => Entity::User,
                "2" => Entity::Artist,
                "3" => Entity::Song,
                "0" => return Ok(()),
                _ => {
                    writeln!(self.out, "Invalid option.")?;
                    continue;
                }
            };
            let Some(id) = self.number(&format!("{} ID: ", entity.table()))? else {
                continue;
            };
            let result = music::delete(self.conn, entity, id);
            self.report_change(result, "Deleted")?;
        }
    }

    fn procedure_menu(&mut self) -> Step {
        loop {
            match self.choose("VIEW PROCEDURES OPTIONS MENU", PROCEDURE_MENU)?.as_str() {
                "1" => {
                    let table = music::song_catalog(self.conn);
                    self.show(table)?;
                }
                "2" => {
                    let Some(limit) = self.count("How many songs: ")? else {
                        continue;
                    };
                    let table = music::most_played_songs(self.conn, limit);
                    self.show(table)?;
                }
                "0" => return Ok(()),
                _ => writeln!(self.out, "Invalid option.")?,
            }
        }
    }

    fn insert_user(&mut self) -> Step {
        let Some(username) = self.required("Username: ")? else {
            return Ok(());
        };
        let email = self.optional("Email (blank for none): ")?;
        let result = music::insert_user(self.conn, &username, email.as_deref());
        self.report_change(result, "Inserted")
    }

    fn insert_artist(&mut self) -> Step {
        let Some(name) = self.required("Artist name: ")? else {
            return Ok(());
        };
        let country = self.optional("Country (blank for none): ")?;
        let result = music::insert_artist(self.conn, &name, country.as_deref());
        self.report_change(result, "Inserted")
    }

    fn insert_song(&mut self) -> Step {
        let Some(title) = self.required("Song title: ")? else {
            return Ok(());
        };
        let Some(artist_id) = self.number("Artist ID: ")? else {
            return Ok(());
        };
        let duration = match self.optional("Duration in seconds (blank for none): ")? {
            None => None,
            Some(text) => match parse_number(&text) {
                Some(seconds) => Some(seconds),
                None => {
                    writeln!(self.out, "Invalid number: {text}")?;
                    return Ok(());
                }
            },
        };
        let result = music::insert_song(self.conn, &title, artist_id, duration);
        self.report_change(result, "Inserted")
    }

    fn update_user(&mut self) -> Step {
        let Some(id) = self.number("User ID: ")? else {
            return Ok(());
        };
        let Some(username) = self.required("New username: ")? else {
            return Ok(());
        };
        let email = self.optional("New email (blank for none): ")?;
        let result = music::update_user(self.conn, id, &username, email.as_deref());
        self.report_change(result, "Updated")
    }

    fn update_artist(&mut self) -> Step {
        let Some(id) = self.number("Artist ID: ")? else {
            return Ok(());
        };
        let Some(name) = self.required("New name: ")? else {
            return Ok(());
        };
        let country = self.optional("New country (blank for none): ")?;
        let result = music::update_artist(self.conn, id, &name, country.as_deref());
        self.report_change(result, "Updated")
    }

    fn update_song_times_played(&mut self) -> Step {
        let Some(id) = self.number("Song ID: ")? else {
            return Ok(());
        };
        let Some(times_played) = self.number("Times played: ")? else {
            return Ok(());
        };
        let result = music::update_song_times_played(self.conn, id, times_played);
        self.report_change(result, "Updated")
    }

    fn transaction_demo(&mut self) -> Step {
        writeln!(self.out, "Running transactional workflow...")?;
        match music::transaction_demo(self.conn) {
            Ok(()) => writeln!(self.out, "Transaction committed.")?,
            Err(e) => {
                tracing::warn!("transaction demo rolled back: {e}");
                writeln!(self.out, "Transaction rolled back: {e}")?
            }
        }
        Ok(())
    }

    fn reset_database(&mut self) -> Step {
        writeln!(self.out, "Resetting database...")?;
        let path = self.ui.reset_script.clone();
        let result = ScriptRunner::new(self.conn, &mut self.out)
            .with_mode(self.ui.mode)
            .with_echo(self.ui.echo)
            .run_file(&path);
        match result {
            Ok(_) => writeln!(self.out, "Database reset complete.")?,
            Err(e @ Error::Script { .. }) => {
                writeln!(self.out, "Failed to reset database: {e}")?
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn run_script_file(&mut self) -> Step {
        let Some(path) = self.required("Script path: ")? else {
            return Ok(());
        };
        let result = ScriptRunner::new(self.conn, &mut self.out)
            .with_mode(self.ui.mode)
            .with_echo(self.ui.echo)
            .run_file(Path::new(&path));
        match result {
            Ok(summary) => writeln!(
                self.out,
                "Script finished: {} succeeded, {} failed.",
                summary.succeeded(),
                summary.failed
            )?,
            Err(e @ Error::Script { .. }) => writeln!(self.out, "Failed to read SQL file: {e}")?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    // helper functions

    fn choose(&mut self, title: &str, options: Options) -> Step<String> {
        writeln!(self.out, "\n===== MUSIC DB {title} =====")?;
        for (key, label) in options {
            writeln!(self.out, "{key}. {label}")?;
        }
        self.out.flush()?;
        self.line("Choose: ")
    }

    fn line(&mut self, prompt: &str) -> Step<String> {
        match self.input.read_line(prompt)? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(Stop::Exit),
        }
    }

    fn required(&mut self, prompt: &str) -> Step<Option<String>> {
        let value = self.line(prompt)?;
        if value.is_empty() {
            writeln!(self.out, "A value is required.")?;
            return Ok(None);
        }
        Ok(Some(value))
    }

    fn optional(&mut self, prompt: &str) -> Step<Option<String>> {
        let value = self.line(prompt)?;
        Ok((!value.is_empty()).then_some(value))
    }

    fn number(&mut self, prompt: &str) -> Step<Option<i64>> {
        let value = self.line(prompt)?;
        let number = parse_number(&value);
        if number.is_none() {
            writeln!(self.out, "Invalid number: {value}")?;
        }
        Ok(number)
    }

    /// A number of at least one; SQLite reads a negative LIMIT as no limit.
    fn count(&mut self, prompt: &str) -> Step<Option<i64>> {
        let value = self.line(prompt)?;
        let count = parse_number(&value).filter(|n| *n >= 1);
        if count.is_none() {
            writeln!(self.out, "Invalid number: {value}")?;
        }
        Ok(count)
    }

    fn show(&mut self, table: crate::Result<ResultTable>) -> Step {
        match table {
            Ok(table) => write!(self.out, "{}", table.render(self.ui.mode))?,
            Err(e) => writeln!(self.out, "Error: {e}")?,
        }
        Ok(())
    }

    fn report_change(&mut self, result: rusqlite::Result<usize>, verb: &str) -> Step {
        match result {
            Ok(0) => writeln!(self.out, "No matching row.")?,
            Ok(n) => writeln!(self.out, "{verb} {n} row(s).")?,
            Err(e) => {
                tracing::debug!("{verb} failed: {e}");
                writeln!(self.out, "Error: {e}")?
            }
        }
        Ok(())
    }
}

fn parse_number(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}
