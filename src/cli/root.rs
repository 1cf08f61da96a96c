use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::replay::ReplayCommand;
use crate::config::Config;
use crate::tui;

/// nice-modal - promise-based modal orchestration in the terminal
#[derive(Parser)]
#[command(
    name = "nice-modal",
    version,
    about = "Promise-based modal orchestration in the terminal",
    long_about = r#"Show, hide and await modals by id instead of threading visibility state
through the component tree.

Examples:
  nice-modal                                  # Start the interactive demo
  nice-modal replay actions.json              # Print the registry after each action
  nice-modal replay actions.json -m a,b       # Treat ids a and b as already mounted"#
)]
pub struct Cli {
    /// Configuration file to use instead of the default locations
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive modal demo
    Demo,

    /// Run recorded modal actions through the reducer
    Replay(ReplayCommand),
}

impl Cli {
    /// Load configuration honoring `--config`
    pub async fn load_config(&self) -> Result<Config> {
        let config = Config::init(self.config.as_deref()).await?;
        debug!("Configuration initialized");
        Ok(config)
    }

    pub async fn execute(self, config: &Config) -> Result<()> {
        match self.command {
            Some(Commands::Replay(replay)) => replay.execute().await,
            Some(Commands::Demo) | None => {
                info!("Starting interactive demo");
                tui::run(config).await?;
                info!("Demo finished");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_the_default() {
        let cli = Cli::try_parse_from(["nice-modal"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_replay_arguments() {
        let cli = Cli::try_parse_from(["nice-modal", "--debug", "replay", "actions.json", "--mounted", "a,b"]).unwrap();
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Replay(replay)) => {
                assert_eq!(replay.file, PathBuf::from("actions.json"));
                assert_eq!(replay.mounted, vec!["a".to_string(), "b".to_string()]);
            }
            _ => panic!("expected replay"),
        }
    }
}
