//! Listing the packs the catalog knows about.

use pnp_extract_core::CatalogRecord;
use pnp_extract_db::{DbError, LayeredCache};

/// One pack, as shown to users choosing a pack code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub code: String,
    pub name: String,
    pub date_release: Option<String>,
}

/// A cycle and its packs, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleListing {
    pub code: String,
    pub name: String,
    pub packs: Vec<PackSummary>,
}

impl CycleListing {
    /// A cycle made of one pack is shown as that pack alone.
    pub fn is_single_pack(&self) -> bool {
        self.packs.len() == 1
    }
}

/// Group every pack under its cycle.
pub fn list_packs(cache: &mut LayeredCache) -> Result<Vec<CycleListing>, DbError> {
    let mut cycles = cache.cycles()?;
    let mut packs = cache.packs()?;
    cycles.sort_by_key(position);
    packs.sort_by_key(position);

    Ok(cycles
        .iter()
        .map(|cycle| {
            let code = cycle.code().unwrap_or_default();
            CycleListing {
                code: code.to_string(),
                name: cycle.str("name").unwrap_or_default().to_string(),
                packs: packs
                    .iter()
                    .filter(|pack| pack.str("cycle_code") == Some(code))
                    .map(summarize)
                    .collect(),
            }
        })
        .collect())
}

/// Render a listing as aligned lines:
///
/// ```text
///  core  Core Set (2012-09-06)
///   wla  Genesis: What Lies Ahead (2012-12-14)
/// ```
pub fn format_pack_listing(cycles: &[CycleListing]) -> Vec<String> {
    let width = cycles
        .iter()
        .flat_map(|c| &c.packs)
        .map(|p| p.code.len())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for cycle in cycles {
        for pack in &cycle.packs {
            let date = pack.date_release.as_deref().unwrap_or_default();
            if cycle.is_single_pack() {
                lines.push(format!("{:>width$}  {} ({date})", pack.code, pack.name));
            } else {
                lines.push(format!(
                    "{:>width$}  {}: {} ({date})",
                    pack.code, cycle.name, pack.name
                ));
            }
        }
    }
    lines
}

fn position(record: &CatalogRecord) -> u32 {
    record.u32("position").unwrap_or(u32::MAX)
}

fn summarize(pack: &CatalogRecord) -> PackSummary {
    PackSummary {
        code: pack.code().unwrap_or_default().to_string(),
        name: pack.str("name").unwrap_or_default().to_string(),
        date_release: pack.str("date_release").map(str::to_string),
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
