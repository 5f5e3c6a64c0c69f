//! `persona start`: boot the kernel and serve the API.

use crate::{boot_kernel, runtime, ui};
use persona_types::config::PersonaConfig;
use std::sync::Arc;

pub fn cmd_start(config: PersonaConfig, listen: Option<String>) {
    let rt = runtime();
    rt.block_on(async {
        let kernel = boot_kernel(config);
        let listen_addr = listen.unwrap_or_else(|| kernel.config.api_listen.clone());

        ui::success(&format!(
            "Kernel booted ({}/{})",
            kernel.config.embedding.provider, kernel.config.embedding.model
        ));
        ui::blank();
        ui::kv("API", &format!("http://{listen_addr}"));
        ui::kv("Database", &kernel.config.sqlite_path().display().to_string());
        ui::kv("Dimensions", &kernel.config.embedding.dimensions.to_string());
        ui::blank();
        ui::hint("POST /api/memories and /api/memories/retrieve");
        ui::hint("Press Ctrl+C to stop");
        ui::blank();

        if let Err(e) = persona_api::server::run_daemon(Arc::new(kernel), &listen_addr).await {
            ui::error(&format!("Server error: {e}"));
            std::process::exit(1);
        }
        println!("  Persona stopped.");
    });
}
