use std::path::PathBuf;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, Config, Context, Editor};
use rustyline_derive::{Helper, Highlighter, Hinter, Validator};

use crate::error::Result;
use crate::menu::LineSource;

const HISTORY_FILE: &str = ".musicdb_history";

/// Line editor for the interactive menus.
pub struct Console {
    editor: Editor<ShellHelper, FileHistory>,
    history: Option<PathBuf>,
}

impl Console {
    pub fn new(keep_history: bool) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::Circular)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(ShellHelper {
            completer: FilenameCompleter::new(),
        }));

        let history = keep_history.then(|| {
            let mut path = home::home_dir().unwrap_or_default();
            path.push(HISTORY_FILE);
            path
        });
        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path.as_path()) {
                tracing::debug!("no history loaded from {}: {e}", path.display());
            }
        }

        Ok(Self { editor, history })
    }

    pub fn save_history(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path.as_path()) {
                tracing::warn!("failed to save history to {}: {e}", path.display());
            }
        }
    }
}

impl LineSource for Console {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str()).ok();
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Completes file names, which is what the script path prompt needs.
#[derive(Helper, Hinter, Validator, Highlighter)]
struct ShellHelper {
    completer: FilenameCompleter,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context,
    ) -> std::result::Result<(usize, Vec<Pair>), ReadlineError> {
        self.completer.complete(line, pos, ctx)
    }
}
