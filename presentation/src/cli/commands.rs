//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plan, per-step results and the answer
    Full,
    /// Only the final answer
    Answer,
    /// JSON output
    Json,
}

/// CLI arguments for stepwise
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(author, version, about = "Plan, execute and report: turn a goal into tool calls")]
#[command(long_about = r#"
Stepwise turns a natural-language goal into a plan of tool calls, runs the
plan step by step, and writes an answer from the collected results.

The process has three phases:
1. Planning: a language model picks tools from the catalog and fills in parameters
2. Execution: every step runs in order; failed steps are recorded, not fatal
3. Reporting: a language model turns the step results into a narrative answer

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./stepwise.toml     Project-level config
3. ~/.config/stepwise/config.toml   Global config

Example:
  stepwise "Plan a 3-day history trip to Beijing"
  stepwise -C budget=5000 -C duration=3 "Weekend in Shanghai"
  stepwise --chat
"#)]
pub struct Cli {
    /// The goal to plan for (not required in chat mode)
    pub goal: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Goal-level constraint as key=value (can be specified multiple times)
    #[arg(short = 'C', long = "constraint", value_name = "KEY=VALUE", value_parser = parse_constraint)]
    pub constraints: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the registered tools and exit
    #[arg(long)]
    pub list_tools: bool,
}

impl Cli {
    /// Constraints as a map; a repeated key keeps its last value
    pub fn constraint_map(&self) -> BTreeMap<String, String> {
        self.constraints.iter().cloned().collect()
    }
}

fn parse_constraint(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty constraint key in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goal_and_constraints() {
        let cli = Cli::try_parse_from([
            "stepwise",
            "-C",
            "budget=5000",
            "--constraint",
            "duration = 3",
            "-C",
            "budget=6000",
            "Trip to Beijing",
        ])
        .unwrap();

        assert_eq!(cli.goal.as_deref(), Some("Trip to Beijing"));
        assert_eq!(cli.output, OutputFormat::Full);
        assert_eq!(
            cli.constraint_map(),
            BTreeMap::from([
                ("budget".to_string(), "6000".to_string()),
                ("duration".to_string(), "3".to_string()),
            ])
        );
    }

    #[test]
    fn test_rejects_constraint_without_equals() {
        assert!(Cli::try_parse_from(["stepwise", "-C", "budget", "goal"]).is_err());
        assert!(Cli::try_parse_from(["stepwise", "-C", "=5", "goal"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli =
            Cli::try_parse_from(["stepwise", "--chat", "-vv", "-q", "-o", "json"]).unwrap();
        assert!(cli.chat);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.goal.is_none());
    }
}
