use std::path::{Path, PathBuf};

use musicdb_shell::config::DatabaseConfig;
use musicdb_shell::connection;
use musicdb_shell::executor::{ScriptRunner, ScriptSummary};
use musicdb_shell::render::OutputMode;
use rusqlite::Connection;

fn reset_script() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("sql/create_and_populate.sql")
}

fn run_file(conn: &Connection, path: &Path, mode: OutputMode) -> (ScriptSummary, String) {
    let mut out = Vec::new();
    let summary = ScriptRunner::new(conn, &mut out)
        .with_mode(mode)
        .run_file(path)
        .unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn reset_script_runs_cleanly() {
    let conn = connection::open(&DatabaseConfig::default()).unwrap();
    let (summary, out) = run_file(&conn, &reset_script(), OutputMode::Column);

    assert_eq!(
        summary,
        ScriptSummary {
            statements: 12,
            failed: 0
        }
    );
    assert!(out.ends_with(
        "\nExecuting SQL:\nSELECT COUNT(*) AS Songs FROM SongCatalog\n\
         \n--- RESULT SET ---\n\nSongs  \n-------\n5      \n\n"
    ));
    // comments never reach the database
    assert!(!out.contains("album version"));
    assert!(!out.contains("seed data"));
}

#[test]
fn reset_script_is_repeatable() {
    let conn = connection::open(&DatabaseConfig::default()).unwrap();
    let (first, _) = run_file(&conn, &reset_script(), OutputMode::Column);
    let (second, _) = run_file(&conn, &reset_script(), OutputMode::Column);
    assert_eq!(first, second);
    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM User", [], |r| r.get(0))
        .unwrap();
    assert_eq!(users, 3);
}

#[test]
fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: Some(dir.path().join("music.db").display().to_string()),
        ..Default::default()
    };
    {
        let conn = connection::open(&config).unwrap();
        run_file(&conn, &reset_script(), OutputMode::Column);
    }

    let read_only = DatabaseConfig {
        read_only: true,
        ..config
    };
    let conn = connection::open(&read_only).unwrap();
    let script = dir.path().join("adhoc.sql");
    std::fs::write(
        &script,
        "SELECT Name FROM Artist WHERE Country = 'DE';\nDELETE FROM Song;\n",
    )
    .unwrap();

    let (summary, out) = run_file(&conn, &script, OutputMode::Ascii);
    assert_eq!(summary.statements, 2);
    assert_eq!(summary.failed, 1);
    assert!(out.contains("| Kraftwerk |"));
    assert!(out.contains("Error executing: DELETE FROM Song"));
    assert!(out.contains("readonly"));
}

#[test]
fn mixed_script_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("mixed.sql");
    std::fs::write(
        &script,
        "\
# playlist table
CREATE TABLE Playlist (
    Name TEXT NOT NULL -- display name
);
INSERT INTO Playlist VALUES (NULL);
INSERT INTO Playlist VALUES ('Road trip');
select Name
  from Playlist;
INSERT INTO Playlist VALUES ('never runs')
",
    )
    .unwrap();

    let conn = Connection::open_in_memory().unwrap();
    let (summary, out) = run_file(&conn, &script, OutputMode::Column);
    assert_eq!(
        summary,
        ScriptSummary {
            statements: 4,
            failed: 1
        }
    );
    assert!(out.contains("Executing SQL:\nCREATE TABLE Playlist ( Name TEXT NOT NULL )\n"));
    assert!(out.contains("NOT NULL constraint failed: Playlist.Name"));
    assert!(out.contains("Executing SQL:\nselect Name from Playlist\n"));
    assert!(out.contains("\nName       \n-----------\nRoad trip  \n"));
    assert!(!out.contains("never runs"));
}
