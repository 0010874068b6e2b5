use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::Result;
use clap::Parser;
use musicdb_shell::config::{ShellConfig, DEFAULT_CONFIG_PATH};
use musicdb_shell::console::Console;
use musicdb_shell::executor::ScriptRunner;
use musicdb_shell::menu::Menu;
use musicdb_shell::render::OutputMode;
use musicdb_shell::{connection, Error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "musicdb")]
#[command(about = "Music database client", long_about = None)]
struct Cli {
    /// Database file; omit for a transient in-memory database
    #[clap(env = "MUSICDB_PATH")]
    db_path: Option<String>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run the SQL script FILE instead of the menus
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
    /// How query results are drawn
    #[arg(long, value_enum)]
    mode: Option<OutputMode>,
    /// Print SQL files before running them
    #[arg(long, default_value = "false")]
    echo: bool,
    /// Open the database read-only
    #[arg(long, default_value = "false")]
    readonly: bool,
    /// Refuse to open symbolic links to database files
    #[arg(long = "nofollow", default_value = "false")]
    no_follow: bool,
}

impl Cli {
    fn load_config(&self) -> musicdb_shell::Result<ShellConfig> {
        let mut config = match &self.config {
            Some(path) => ShellConfig::load(path, true)?,
            None => ShellConfig::load(Path::new(DEFAULT_CONFIG_PATH), false)?,
        };
        if self.db_path.is_some() {
            config.database.path = self.db_path.clone();
        }
        config.database.read_only |= self.readonly;
        config.database.no_follow |= self.no_follow;
        if let Some(mode) = self.mode {
            config.shell.mode = mode;
        }
        config.shell.echo |= self.echo;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            println!("{e}");
            println!("DB connection failed.");
            exit(1);
        }
    };

    let mut conn = match connection::open(&config.database) {
        Ok(conn) => conn,
        Err(e) => {
            println!("Failed to connect: {e}");
            println!("DB connection failed.");
            exit(1);
        }
    };
    if connection::is_in_memory(&config.database) {
        println!("Connected to a transient in-memory database.");
    } else {
        println!("Connected to DB successfully!");
    }

    if let Some(path) = &args.script {
        let mut stdout = std::io::stdout().lock();
        let result = ScriptRunner::new(&conn, &mut stdout)
            .with_mode(config.shell.mode)
            .with_echo(config.shell.echo)
            .run_file(path);
        stdout.flush()?;
        return match result {
            Ok(_) => Ok(()),
            Err(e @ Error::Script { .. }) => {
                println!("Failed to read SQL file: {e}");
                exit(1);
            }
            Err(e) => Err(e.into()),
        };
    }

    let mut console = Console::new(config.shell.history)?;
    let result = Menu::new(&mut conn, &mut console, std::io::stdout(), config.shell).run();
    console.save_history();
    result?;
    Ok(())
}
