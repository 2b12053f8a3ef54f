use std::cmp::Ordering;
use std::fmt::Write;

use plexus_core::PluginManager;
use plexus_core::mime::GlobMatchResult;

/// Renders the load order followed by every unit's state and error.
pub fn render_plugin_report(manager: &PluginManager) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Load order:");
    let queue = manager.load_queue();
    if queue.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (position, name) in queue.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", position + 1, name);
    }

    let _ = writeln!(out, "Plugins:");
    for unit in manager.units() {
        let enabled = if unit.is_effectively_enabled() { "enabled" } else { "disabled" };
        let _ = writeln!(out, "  {} {} [{}, {}]", unit.name(), unit.version(), unit.state(), enabled);
        if unit.has_error() {
            for (index, line) in unit.error_string().lines().enumerate() {
                let label = if index == 0 { "error: " } else { "       " };
                let _ = writeln!(out, "    {}{}", label, line);
            }
        }
    }
    out
}

/// `filename: type[, type...]`, plus the matched suffix when there is one
pub fn render_mime_match(filename: &str, result: &GlobMatchResult) -> String {
    let types = if result.is_empty() {
        "(no match)".to_string()
    } else {
        result.mime_types.join(", ")
    };
    match &result.found_suffix {
        Some(suffix) => format!("{}: {} (suffix: {})", filename, types, suffix),
        None => format!("{}: {}", filename, types),
    }
}

pub fn render_ordering(ordering: Option<Ordering>) -> &'static str {
    match ordering {
        Some(Ordering::Less) => "less",
        Some(Ordering::Equal) => "equal",
        Some(Ordering::Greater) => "greater",
        None => "invalid",
    }
}
