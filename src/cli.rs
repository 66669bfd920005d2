use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arctic-guide")]
#[command(about = "Arctic Bear landing page with a Gemini-backed cold-therapy guide")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Ignore any API key and answer with the offline reply
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the interactive landing page and chat widget
    Chat,

    /// Ask the guide a single question and print the reply
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show the effective configuration
    Config {
        /// Print only the config file location
        #[arg(long)]
        path: bool,
    },
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_is_default() {
        let cli = Cli::parse_from(["arctic-guide"]);
        assert_eq!(cli.command(), &Commands::Chat);
        assert!(!cli.offline);
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["arctic-guide", "--offline", "ask", "Как", "начать?"]);
        assert!(cli.offline);
        match cli.command() {
            Commands::Ask { text } => assert_eq!(text.join(" "), "Как начать?"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["arctic-guide", "-d", "--config", "/tmp/guide.toml", "config", "--path"]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/guide.toml")));
        assert_eq!(cli.command(), &Commands::Config { path: true });
    }
}
