//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::ProgressReporter;
use crate::cli::commands::OutputFormat;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use stepwise_application::{Engine, ExecutionProgress, NoProgress, RunInput};
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Tools,
    Clear,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` when the line is a goal rather than a command
    fn parse(line: &str) -> Option<Self> {
        match line {
            "exit" | "quit" => return Some(Command::Quit),
            _ if !line.starts_with('/') => return None,
            _ => {}
        }

        Some(match line {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/tools" => Command::Tools,
            "/clear" => Command::Clear,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL.
///
/// Every goal runs in one session, so the plan generator sees the earlier
/// goals and answers of this process.
pub struct ChatRepl {
    engine: Arc<Engine>,
    session_id: String,
    constraints: BTreeMap<String, String>,
    output: OutputFormat,
    show_progress: bool,
}

impl ChatRepl {
    pub fn new(engine: Arc<Engine>) -> Self {
        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Self {
            engine,
            session_id: format!("chat-{}-{}", std::process::id(), started),
            constraints: BTreeMap::new(),
            output: OutputFormat::Answer,
            show_progress: true,
        }
    }

    /// Constraints applied to every goal of the session
    pub fn with_constraints(mut self, constraints: BTreeMap<String, String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("stepwise").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = Command::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_goal(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Stepwise - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Tools: {}", self.engine.registry().names().collect::<Vec<_>>().join(", "));
        if !self.constraints.is_empty() {
            let constraints = self
                .constraints
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>();
            println!("Constraints: {}", constraints.join(", "));
        }
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /tools           - List available tools");
        println!("  /clear           - Forget this conversation");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
        println!("Press Ctrl-C during a run to cancel the remaining steps.");
        println!();
    }

    /// Returns true if the REPL should exit.
    fn handle_command(&self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => {
                println!();
                Self::print_help();
            }
            Command::Tools => {
                println!();
                println!("{}", ConsoleFormatter::format_tools(self.engine.registry()));
            }
            Command::Clear => {
                self.engine.clear_session(&self.session_id);
                println!("Conversation cleared.");
            }
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_goal(&self, goal: &str) {
        println!();

        let token = CancellationToken::new();
        let watcher = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            })
        };

        let input = RunInput::new(goal).with_constraints(self.constraints.clone());
        let reporter = self
            .show_progress
            .then(|| ProgressReporter::new().with_streaming(true));
        let progress: &dyn ExecutionProgress = match &reporter {
            Some(reporter) => reporter,
            None => &NoProgress,
        };

        let result = self
            .engine
            .run_in_session(&self.session_id, input, &Some(token), progress)
            .await;
        watcher.abort();
        if let Some(reporter) = &reporter {
            reporter.finish();
        }

        let streamed = reporter.as_ref().is_some_and(ProgressReporter::streamed_answer);

        match result {
            Ok(outcome) if streamed && !outcome.degraded && self.output == OutputFormat::Answer => {
                // Already shown while it was written
            }
            Ok(outcome) => {
                let output = match self.output {
                    OutputFormat::Full => ConsoleFormatter::format(&outcome),
                    OutputFormat::Answer => ConsoleFormatter::format_answer(&outcome),
                    OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
                };
                if outcome.degraded && self.output == OutputFormat::Answer {
                    eprintln!("{}", "(answer could not be written; showing the raw report)".yellow());
                }
                println!("{}", output);
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("/q"), Some(Command::Quit));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("/tools"), Some(Command::Tools));
        assert_eq!(Command::parse("/clear"), Some(Command::Clear));
        assert_eq!(Command::parse("/?"), Some(Command::Help));
        assert_eq!(
            Command::parse("/models"),
            Some(Command::Unknown("/models".to_string()))
        );
    }

    #[test]
    fn test_goals_are_not_commands() {
        assert_eq!(Command::parse("Plan a trip to Beijing"), None);
        assert_eq!(Command::parse("quit smoking plan"), None);
    }
}
