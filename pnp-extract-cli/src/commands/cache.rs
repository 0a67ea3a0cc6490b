use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pnp_extract_db::DiskTier;

use crate::error::CliError;

/// Print the cache directory.
pub(crate) fn run_cache_path(dir: &Path) -> Result<(), CliError> {
    println!("{}", dir.display());
    Ok(())
}

/// List cached API responses.
pub(crate) fn run_cache_list(dir: &Path) -> Result<(), CliError> {
    let entries = DiskTier::new(dir).list()?;
    if entries.is_empty() {
        println!(
            "{}",
            "No cached responses.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        println!("Run 'pnp-extract list-packs' to fetch the pack list.");
        return Ok(());
    }

    println!(
        "{} {}",
        "Cached responses in".if_supports_color(Stdout, |t| t.bold()),
        dir.display(),
    );
    println!();

    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    let mut total_size = 0u64;
    for entry in &entries {
        total_size += entry.file_size;
        let modified = entry
            .last_modified
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "  {}  {:>9}  last modified {}",
            format!("{:<width$}", entry.key).if_supports_color(Stdout, |t| t.cyan()),
            format_bytes(entry.file_size),
            modified,
        );
    }
    println!();
    println!(
        "Total: {} files, {}",
        entries.len(),
        format_bytes(total_size)
    );
    Ok(())
}

/// Remove every cached API response.
pub(crate) fn run_cache_clear(dir: &Path) -> Result<(), CliError> {
    let freed = DiskTier::new(dir).clear()?;
    println!(
        "{} Cache cleared ({} freed)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        format_bytes(freed),
    );
    Ok(())
}

/// Format a byte count with fractional KB/MB (e.g., "1.5 KB", "2.3 MB").
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
