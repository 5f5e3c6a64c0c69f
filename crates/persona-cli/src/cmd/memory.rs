//! One-shot memory commands that run against an in-process kernel.

use crate::{boot_kernel, runtime, ui};
use persona_types::tool::memory_tool_definitions;
use persona_types::config::PersonaConfig;

pub fn cmd_store(config: PersonaConfig, user: &str, memory_type: &str, content: &str) {
    let kernel = boot_kernel(config);
    let resp = runtime().block_on(kernel.memory.store(user, memory_type, content));
    if resp.success {
        let id = resp.id.map(|id| id.to_string()).unwrap_or_default();
        ui::success(&format!("{} (id {id})", resp.message));
    } else {
        ui::error_with_fix(
            &format!(
                "{}: {}",
                resp.message,
                resp.error.as_deref().unwrap_or("unknown")
            ),
            resp.details.as_deref().unwrap_or("check the logs"),
        );
        std::process::exit(1);
    }
}

pub fn cmd_retrieve(
    config: PersonaConfig,
    user: &str,
    query: &str,
    top_k: Option<usize>,
    min_similarity: Option<f32>,
    json: bool,
) {
    let kernel = boot_kernel(config);
    let resp = runtime().block_on(kernel.memory.retrieve(user, query, top_k, min_similarity));

    if json {
        match serde_json::to_string_pretty(&resp) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                ui::error(&format!("Failed to encode response: {e}"));
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(kind) = &resp.error {
        ui::warn(&format!(
            "Retrieval failed ({kind}): {}",
            resp.details.as_deref().unwrap_or("")
        ));
    }
    if resp.memories.is_empty() {
        println!("  No relevant memories for '{user}'.");
        return;
    }
    ui::section(&format!("{} memories for '{user}'", resp.memories.len()));
    for (i, m) in resp.memories.iter().enumerate() {
        ui::scored_memory(i + 1, m);
    }
}

pub fn cmd_list(config: PersonaConfig, user: &str) {
    let kernel = boot_kernel(config);
    match runtime().block_on(kernel.memory.list(user)) {
        Ok(records) if records.is_empty() => println!("  No memories stored for '{user}'."),
        Ok(records) => {
            ui::section(&format!("{} memories for '{user}'", records.len()));
            for r in &records {
                ui::memory_record(r);
            }
        }
        Err(e) => {
            ui::error(&e.to_string());
            std::process::exit(1);
        }
    }
}

pub fn cmd_tools() {
    match serde_json::to_string_pretty(&memory_tool_definitions()) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            ui::error(&format!("Failed to encode tool definitions: {e}"));
            std::process::exit(1);
        }
    }
}
