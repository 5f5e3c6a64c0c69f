//! Terminal output helpers.

use colored::Colorize;
use persona_types::memory::{MemoryRecord, ScoredMemory};

pub fn success(msg: &str) {
    println!("  {} {}", "\u{2714}".bright_green(), msg);
}

pub fn error(msg: &str) {
    eprintln!("  {} {}", "\u{2718}".bright_red(), msg.bright_red());
}

/// Red error + yellow "fix:" suggestion.
pub fn error_with_fix(msg: &str, fix: &str) {
    eprintln!("  {} {}", "\u{2718}".bright_red(), msg.bright_red());
    eprintln!("    {} {}", "fix:".bright_yellow(), fix);
}

pub fn warn(msg: &str) {
    println!("  {} {}", "-".bright_yellow(), msg.yellow());
}

/// Section header: ">> Title" in cyan.
pub fn section(title: &str) {
    println!("  {} {}", ">>".bright_cyan().bold(), title.bold());
}

/// Key-value display: "  Label:       value".
pub fn kv(label: &str, value: &str) {
    println!("  {:<13}{}", format!("{label}:"), value);
}

pub fn hint(msg: &str) {
    println!("  {} {}", "hint:".dimmed(), msg.dimmed());
}

pub fn blank() {
    println!();
}

/// One ranked memory: rank, scores, type, and content.
pub fn scored_memory(rank: usize, m: &ScoredMemory) {
    println!(
        "  {:>2}. {} {} {}",
        rank,
        format!("[{:.3}]", m.combined_score).bright_cyan(),
        format!("{:<15}", m.record.memory_type.as_str()).dimmed(),
        m.record.content
    );
    println!(
        "      {}",
        format!(
            "similarity {:.3}  recency {:.3}  stored {}",
            m.similarity,
            m.time_relevance,
            m.record.created_at.format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
}

/// One stored memory without scores.
pub fn memory_record(m: &MemoryRecord) {
    println!(
        "  {:>5}  {}  {} {}",
        m.id.to_string().dimmed(),
        m.created_at.format("%Y-%m-%d %H:%M"),
        format!("{:<15}", m.memory_type.as_str()).dimmed(),
        m.content
    );
}
