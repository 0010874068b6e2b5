//! Runs SQL scripts statement by statement against a live connection.
//!
//! Every statement is echoed before it runs and its outcome is reported right
//! after. A failing statement never stops the script; only failing to read the
//! script file aborts a run, and that happens before anything executes.

use std::io::Write;
use std::path::Path;

use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::render::{OutputMode, ResultTable};
use crate::script::{has_trailing_statement, ScriptStatements};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Produces rows to display
    Query,
    /// Runs for its effect only
    Command,
}

impl StatementKind {
    pub fn classify(sql: &str) -> Self {
        let is_select = sql
            .trim_start()
            .get(..6)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("select"));
        if is_select {
            StatementKind::Query
        } else {
            StatementKind::Command
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Rows(ResultTable),
    Executed,
    /// The statement could not be prepared or run
    Failed(String),
    /// The query ran but its rows could not be read
    RenderFailed(String),
}

impl StatementOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StatementOutcome::Rows(_) | StatementOutcome::Executed)
    }
}

/// Executes one statement without printing anything.
///
/// Text holding more than one statement fails before anything runs.
pub fn execute_statement(conn: &Connection, sql: &str) -> StatementOutcome {
    if has_trailing_statement(sql) {
        return StatementOutcome::Failed(rusqlite::Error::MultipleStatement.to_string());
    }
    match StatementKind::classify(sql) {
        StatementKind::Query => {
            let mut stmt = match conn.prepare(sql) {
                Ok(stmt) => stmt,
                Err(e) => return StatementOutcome::Failed(e.to_string()),
            };
            match ResultTable::from_query(&mut stmt, []) {
                Ok(table) => StatementOutcome::Rows(table),
                Err(e) => StatementOutcome::RenderFailed(e.to_string()),
            }
        }
        // rows produced by a command (e.g. a pragma) are discarded
        StatementKind::Command => match conn.execute_batch(sql) {
            Ok(()) => StatementOutcome::Executed,
            Err(e) => StatementOutcome::Failed(e.to_string()),
        },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub statements: usize,
    pub failed: usize,
}

impl ScriptSummary {
    pub fn succeeded(&self) -> usize {
        self.statements - self.failed
    }
}

pub struct ScriptRunner<'a, W> {
    conn: &'a Connection,
    out: W,
    mode: OutputMode,
    echo: bool,
}

impl<'a, W: Write> ScriptRunner<'a, W> {
    pub fn new(conn: &'a Connection, out: W) -> Self {
        Self {
            conn,
            out,
            mode: OutputMode::default(),
            echo: false,
        }
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Print the whole file before running it
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn run_file(&mut self, path: &Path) -> Result<ScriptSummary> {
        let script = std::fs::read_to_string(path).map_err(|source| Error::Script {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("running script {}", path.display());
        if self.echo {
            self.print_script(path, &script)?;
        }
        let summary = self.run_script(&script)?;
        tracing::info!(
            statements = summary.statements,
            failed = summary.failed,
            "finished script {}",
            path.display()
        );
        Ok(summary)
    }

    pub fn run_script(&mut self, script: &str) -> Result<ScriptSummary> {
        let mut summary = ScriptSummary::default();
        for statement in ScriptStatements::new(script) {
            let outcome = self.run_statement(&statement)?;
            summary.statements += 1;
            if !outcome.is_success() {
                summary.failed += 1;
            }
        }
        Ok(summary)
    }

    /// Executes `sql` and reports the outcome.
    pub fn run_statement(&mut self, sql: &str) -> Result<StatementOutcome> {
        writeln!(self.out, "\nExecuting SQL:\n{sql}")?;
        let outcome = execute_statement(self.conn, sql);
        match &outcome {
            StatementOutcome::Rows(table) => {
                writeln!(self.out, "\n--- RESULT SET ---")?;
                write!(self.out, "{}", table.render(self.mode))?;
            }
            StatementOutcome::Executed => {
                writeln!(self.out, "Statement executed successfully.")?;
            }
            StatementOutcome::Failed(message) => {
                tracing::warn!("statement failed: {message}");
                writeln!(self.out, "\n--- SQL EXECUTION ERROR ---")?;
                writeln!(self.out, "Error executing: {sql}")?;
                writeln!(self.out, "Message: {message}")?;
            }
            StatementOutcome::RenderFailed(message) => {
                tracing::warn!("reading query result failed: {message}");
                writeln!(self.out, "Error printing SELECT result: {message}")?;
            }
        }
        Ok(outcome)
    }

    fn print_script(&mut self, path: &Path, script: &str) -> Result<()> {
        writeln!(self.out, "\n--- SQL FILE: {} ---", path.display())?;
        for line in script.lines() {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "\n--- END OF SQL FILE ---\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(conn: &Connection, script: &str) -> (ScriptSummary, String) {
        let mut out = Vec::new();
        let summary = ScriptRunner::new(conn, &mut out)
            .run_script(script)
            .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn classify_select_prefix() {
        assert_eq!(StatementKind::classify("SELECT 1"), StatementKind::Query);
        assert_eq!(StatementKind::classify("  select * from t"), StatementKind::Query);
        assert_eq!(StatementKind::classify("\tSeLeCt 1"), StatementKind::Query);
        assert_eq!(
            StatementKind::classify("INSERT INTO t SELECT 1"),
            StatementKind::Command
        );
        assert_eq!(StatementKind::classify("sel"), StatementKind::Command);
        assert_eq!(StatementKind::classify(""), StatementKind::Command);
        assert_eq!(StatementKind::classify("ésélect"), StatementKind::Command);
    }

    #[test]
    fn command_then_query() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(
            execute_statement(&conn, "CREATE TABLE t (a INTEGER, b TEXT)"),
            StatementOutcome::Executed
        );
        assert_eq!(
            execute_statement(&conn, "INSERT INTO t VALUES (1, NULL)"),
            StatementOutcome::Executed
        );
        let StatementOutcome::Rows(table) = execute_statement(&conn, "SELECT a, b FROM t") else {
            panic!("expected rows");
        };
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.rows(), [vec![Some("1".to_string()), None]]);
    }

    #[test]
    fn command_returning_rows_succeeds() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(
            execute_statement(&conn, "PRAGMA user_version"),
            StatementOutcome::Executed
        );
    }

    #[test]
    fn failures_are_values() {
        let conn = Connection::open_in_memory().unwrap();
        let outcome = execute_statement(&conn, "SELECT * FROM missing");
        assert!(matches!(outcome, StatementOutcome::Failed(ref m) if m.contains("missing")));
        assert!(!outcome.is_success());
        let outcome = execute_statement(&conn, "DROP TABLE missing");
        assert!(matches!(outcome, StatementOutcome::Failed(_)));
    }

    fn count_rows(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn query_with_second_statement_fails() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2);")
            .unwrap();
        let outcome = execute_statement(&conn, "SELECT 1; DELETE FROM t");
        assert_eq!(
            outcome,
            StatementOutcome::Failed("Multiple statements provided".to_string())
        );
        assert_eq!(count_rows(&conn), 2);
    }

    #[test]
    fn command_with_second_statement_fails() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER)").unwrap();
        let outcome =
            execute_statement(&conn, "INSERT INTO t VALUES (1); INSERT INTO t VALUES (2)");
        assert!(matches!(outcome, StatementOutcome::Failed(_)));
        assert_eq!(count_rows(&conn), 0);

        // a semicolon inside a literal is not a separator
        assert_eq!(
            execute_statement(&conn, "INSERT INTO t VALUES (length('a;b'))"),
            StatementOutcome::Executed
        );
        assert_eq!(count_rows(&conn), 1);
    }

    #[test]
    fn one_line_with_two_statements_is_reported() {
        let conn = Connection::open_in_memory().unwrap();
        let (summary, out) = run(&conn, "CREATE TABLE t (a INTEGER); DROP TABLE t;
");
        assert_eq!(
            summary,
            ScriptSummary {
                statements: 1,
                failed: 1
            }
        );
        assert!(out.contains(
            "Error executing: CREATE TABLE t (a INTEGER); DROP TABLE t
             Message: Multiple statements provided
"
        ));
        assert!(conn.prepare("SELECT * FROM t").is_err());
    }

    #[test]
    fn unreadable_rows_do_not_stop_the_script() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            execute_statement(&conn, "SELECT abs(-9223372036854775807 - 1)"),
            StatementOutcome::RenderFailed(ref m) if m.contains("integer overflow")
        ));

        let (summary, out) = run(
            &conn,
            "SELECT abs(-9223372036854775807 - 1);
SELECT 1 AS one;
",
        );
        assert_eq!(
            summary,
            ScriptSummary {
                statements: 2,
                failed: 1
            }
        );
        assert!(out.contains("Error printing SELECT result: integer overflow
"));
        assert!(!out.contains("SQL EXECUTION ERROR"));
        assert!(out.ends_with(
            "
Executing SQL:
SELECT 1 AS one

--- RESULT SET ---

one  
-----
1    

"
        ));
    }

    #[test]
    fn failing_statement_does_not_stop_the_script() {
        let conn = Connection::open_in_memory().unwrap();
        let script = "\
CREATE TABLE t (a INTEGER PRIMARY KEY);
INSERT INTO t VALUES (1);
INSERT INTO t VALUES (1);
INSERT INTO t VALUES (2);
SELECT COUNT(*) AS n FROM t;
";
        let (summary, out) = run(&conn, script);
        assert_eq!(
            summary,
            ScriptSummary {
                statements: 5,
                failed: 1
            }
        );
        assert_eq!(summary.succeeded(), 4);
        assert!(out.contains("\n--- SQL EXECUTION ERROR ---\nError executing: INSERT INTO t VALUES (1)\nMessage: "));
        assert!(out.contains("UNIQUE constraint failed"));
        assert!(out.ends_with("\n--- RESULT SET ---\n\nn  \n---\n2  \n\n"));
    }

    #[test]
    fn report_layout() {
        let conn = Connection::open_in_memory().unwrap();
        let (_, out) = run(&conn, "CREATE TABLE t (a INTEGER);\nSELECT a FROM t;");
        assert_eq!(
            out,
            "\nExecuting SQL:\nCREATE TABLE t (a INTEGER)\n\
             Statement executed successfully.\n\
             \nExecuting SQL:\nSELECT a FROM t\n\
             \n--- RESULT SET ---\n\na  \n---\n\n"
        );
    }

    #[test]
    fn unterminated_statement_never_runs() {
        let conn = Connection::open_in_memory().unwrap();
        let (summary, out) = run(&conn, "CREATE TABLE t (a INTEGER)");
        assert_eq!(summary, ScriptSummary::default());
        assert!(out.is_empty());
        assert!(conn.prepare("SELECT * FROM t").is_err());
    }

    #[test]
    fn missing_file_aborts_before_running() {
        let conn = Connection::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = ScriptRunner::new(&conn, &mut out)
            .run_file(&dir.path().join("nope.sql"))
            .unwrap_err();
        assert!(matches!(err, Error::Script { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn echo_prints_file_first() {
        let conn = Connection::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.sql");
        std::fs::write(&path, "-- hello\nSELECT 1 AS one;\n").unwrap();

        let mut out = Vec::new();
        let summary = ScriptRunner::new(&conn, &mut out)
            .with_echo(true)
            .run_file(&path)
            .unwrap();
        assert_eq!(summary.statements, 1);

        let out = String::from_utf8(out).unwrap();
        let header = format!("\n--- SQL FILE: {} ---\n-- hello\nSELECT 1 AS one;\n", path.display());
        assert!(out.starts_with(&header));
        let end = out.find("--- END OF SQL FILE ---").unwrap();
        let executing = out.find("Executing SQL:").unwrap();
        assert!(end < executing);
    }
}
