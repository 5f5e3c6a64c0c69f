//! `persona config`: print the effective configuration.

use crate::ui;
use persona_kernel::config::ConfigSource;
use persona_types::config::PersonaConfig;

pub fn cmd_config(cfg: &PersonaConfig, source: &ConfigSource) {
    let note = match source {
        ConfigSource::File(_) => String::new(),
        ConfigSource::Missing(_) => " (not found, defaults)".to_string(),
        ConfigSource::Invalid { error, .. } => format!(" (invalid, defaults: {error})"),
    };

    ui::section("Configuration");
    ui::kv("File", &format!("{}{note}", source.path().display()));
    ui::kv("Database", &cfg.sqlite_path().display().to_string());
    ui::kv("API", &cfg.api_listen);
    ui::kv(
        "Embedding",
        &format!(
            "{}/{} ({} dims)",
            cfg.embedding.provider, cfg.embedding.model, cfg.embedding.dimensions
        ),
    );
    ui::blank();

    match toml::to_string_pretty(cfg) {
        Ok(s) => println!("{s}"),
        Err(e) => ui::error(&format!("Failed to render config: {e}")),
    }

    let warnings = cfg.validate();
    if warnings.is_empty() {
        ui::success("No problems found");
    } else {
        for w in &warnings {
            ui::warn(w);
        }
    }
}
