//! Persona CLI: serve the memory API or run one-shot memory commands.

mod cli;
mod cmd;
mod ui;

use crate::cli::{Cli, Commands};
use clap::Parser;
use persona_kernel::config::{resolve_config, ConfigSource};
use persona_kernel::error::KernelError;
use persona_kernel::PersonaKernel;
use persona_types::config::PersonaConfig;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise the configured `log_level`.
fn init_tracing_stderr(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            ui::error(&format!("Failed to start async runtime: {e}"));
            std::process::exit(1);
        }
    }
}

/// Read the config once, install logging at its `log_level`, then report
/// where the config came from through that subscriber.
fn init_from_config(cli: &Cli) -> (PersonaConfig, ConfigSource) {
    let (config, source) = resolve_config(cli.config.as_deref());
    init_tracing_stderr(&config.log_level);
    source.log();
    (config, source)
}

/// Boot the kernel or exit with a readable message.
pub(crate) fn boot_kernel(config: PersonaConfig) -> PersonaKernel {
    match PersonaKernel::boot_with_config(config) {
        Ok(kernel) => kernel,
        Err(e) => {
            let fix = match &e {
                KernelError::BootFailed(_) => {
                    "Export the API key named by embedding.api_key_env, or choose a local provider"
                }
                KernelError::Persona(p) if p.kind() == "config_error" => {
                    "Point memory.sqlite_path at a new database, or restore the original embedding settings"
                }
                KernelError::Persona(_) => "Check that the data directory is writable",
            };
            ui::error_with_fix(&format!("Failed to boot: {e}"), fix);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let (config, source) = init_from_config(&cli);

    match cli.command {
        Commands::Start { listen } => cmd::start::cmd_start(config, listen),
        Commands::Store {
            user,
            memory_type,
            content,
        } => cmd::memory::cmd_store(config, &user, &memory_type, &content),
        Commands::Retrieve {
            user,
            query,
            top_k,
            min_similarity,
            json,
        } => cmd::memory::cmd_retrieve(config, &user, &query, top_k, min_similarity, json),
        Commands::List { user } => cmd::memory::cmd_list(config, &user),
        Commands::Tools => cmd::memory::cmd_tools(),
        Commands::Config => cmd::config::cmd_config(&config, &source),
    }
}
