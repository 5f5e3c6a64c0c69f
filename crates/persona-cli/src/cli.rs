//! Clap CLI definitions for Persona.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const AFTER_HELP: &str = "\
\x1b[1;36mExamples:\x1b[0m
  persona start                                     Serve the HTTP API
  persona store --user u1 --type interest --content \"likes jazz\"
  persona retrieve --user u1 --query \"what music do I like?\"
  persona list --user u1                            Show every memory for a user
  persona tools                                     Print the memory tool schemas
  persona config                                    Show the effective configuration";

/// Persona: long-term, per-user memory for conversational agents.
#[derive(Parser)]
#[command(name = "persona", version, about, after_help = AFTER_HELP)]
pub struct Cli {
    /// Path to config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API until Ctrl+C.
    Start {
        /// Override `api_listen` from the config.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Store one memory for a user.
    Store {
        /// Owner of the memory.
        #[arg(long)]
        user: String,
        /// interest, learning_goal, knowledge_level, or key_point.
        #[arg(long = "type")]
        memory_type: String,
        /// Memory text.
        #[arg(long)]
        content: String,
    },
    /// Retrieve the memories most relevant to a query.
    Retrieve {
        #[arg(long)]
        user: String,
        #[arg(long)]
        query: String,
        /// Maximum number of results.
        #[arg(long)]
        top_k: Option<usize>,
        /// Similarity a memory must exceed to be returned.
        #[arg(long, allow_hyphen_values = true)]
        min_similarity: Option<f32>,
        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,
    },
    /// List every memory stored for a user.
    List {
        #[arg(long)]
        user: String,
    },
    /// Print the memory tool definitions as JSON.
    Tools,
    /// Show the effective configuration and any problems with it.
    Config,
}
