use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::catalog::schema::{
    normalize_key, Category, Facet, ScoreTable, SkillCatalog, SkillEntry,
};

/// Supplementary cost map entry (the JSON sidecar format): authoritative
/// costs plus the dependency cross-references the CSV does not carry.
#[derive(Debug, Clone, Deserialize)]
pub struct CostMapEntry {
    pub name: String,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_skills: Vec<String>,
    #[serde(default)]
    pub versions: Vec<String>,
}

/// Loads a catalog file, dispatching on extension (`.json` or `.csv`).
pub fn load_catalog(path: &Path) -> Result<SkillCatalog> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading catalog: {}", path.display()))?;
    let entries = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&data)
            .with_context(|| format!("failed parsing JSON catalog: {}", path.display()))?,
        Some("csv") => parse_csv(&data)
            .with_context(|| format!("failed parsing CSV catalog: {}", path.display()))?,
        other => bail!(
            "unsupported catalog format {:?} for {}",
            other,
            path.display()
        ),
    };
    if entries.is_empty() {
        bail!("catalog is empty: {}", path.display());
    }
    info!(
        entries = entries.len(),
        path = %path.display(),
        "loaded skill catalog"
    );
    Ok(SkillCatalog::with_hash(path.display().to_string(), entries))
}

/// Loads a catalog and, when given, merges a JSON cost map over it. Cost-map
/// costs win over catalog base costs, matching the sidecar's authority in
/// the original data set.
pub fn load_catalog_with_costs(path: &Path, cost_map: Option<&Path>) -> Result<SkillCatalog> {
    let catalog = load_catalog(path)?;
    let Some(cost_path) = cost_map else {
        return Ok(catalog);
    };
    let data = fs::read_to_string(cost_path)
        .with_context(|| format!("failed reading cost map: {}", cost_path.display()))?;
    let map: Vec<CostMapEntry> = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing cost map: {}", cost_path.display()))?;
    let mut entries = catalog.entries;
    apply_cost_map(&mut entries, &map);
    Ok(SkillCatalog::with_hash(
        format!("{} + {}", path.display(), cost_path.display()),
        entries,
    ))
}

pub fn apply_cost_map(entries: &mut [SkillEntry], map: &[CostMapEntry]) {
    let mut by_key: HashMap<String, &CostMapEntry> = HashMap::new();
    for item in map {
        by_key.entry(normalize_key(&item.name)).or_insert(item);
    }
    for entry in entries.iter_mut() {
        let Some(meta) = by_key.get(&normalize_key(&entry.name)) else {
            continue;
        };
        if let Some(cost) = meta.cost {
            entry.base_cost = Some(cost);
        }
        if entry.skill_id.is_none() {
            entry.skill_id = meta.id.clone();
        }
        if entry.parent_ids.is_empty() && !entry.category.is_premium() {
            entry.parent_ids = meta.parent_skills.clone();
        }
        if entry.lower_id.is_none() {
            entry.lower_id = meta.versions.first().cloned();
        }
    }
}

fn parse_json(data: &str) -> Result<Vec<SkillEntry>> {
    let entries: Vec<SkillEntry> = serde_json::from_str(data)?;
    Ok(entries)
}

/// Header-indexed CSV parsing. The expected shape is the skill sheet the
/// original data ships: `skill_type,name,base,base_value,s_a,b_c,d_e_f,g,
/// affinity_role` with `apt_1..apt_4` as alternate bucket columns. Rows
/// with no name or an unrecognized category are skipped.
fn parse_csv(data: &str) -> Result<Vec<SkillEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let idx_type = col("skill_type");
    let idx_name = col("name").context("catalog CSV has no 'name' column")?;
    let idx_base = col("base");
    let idx_base_value = col("base_value");
    let idx_good = col("s_a").or_else(|| col("apt_1"));
    let idx_average = col("b_c").or_else(|| col("apt_2"));
    let idx_bad = col("d_e_f").or_else(|| col("apt_3"));
    let idx_terrible = col("g").or_else(|| col("apt_4"));
    let idx_facet = col("affinity_role").or_else(|| col("affinity"));
    let idx_parents = col("parent_ids");
    let idx_lower = col("lower_id");
    let idx_id = col("skill_id").or_else(|| col("id"));

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let num = |record: &csv::StringRecord, idx: Option<usize>| -> Option<u32> {
        field(record, idx).and_then(|s| s.parse().ok())
    };

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(name) = field(&record, Some(idx_name)) else {
            continue;
        };
        let category = match field(&record, idx_type)
            .unwrap_or_default()
            .parse::<Category>()
        {
            Ok(cat) => cat,
            Err(_) => {
                debug!(name, "skipping catalog row with unknown category");
                continue;
            }
        };

        let base_cost = num(&record, idx_base);
        let base_score = num(&record, idx_base_value).or(base_cost);
        let good = num(&record, idx_good).or(base_score);
        let average = num(&record, idx_average).or(good);
        let bad = num(&record, idx_bad).or(average);
        let terrible = num(&record, idx_terrible).or(bad);
        let score = match (base_score, good, average, bad, terrible) {
            (Some(base), Some(good), Some(average), Some(bad), Some(terrible)) => {
                ScoreTable::Bucketed {
                    base,
                    good,
                    average,
                    bad,
                    terrible,
                }
            }
            (Some(base), ..) => ScoreTable::Flat(base),
            _ => {
                debug!(name, "skipping catalog row with no score data");
                continue;
            }
        };

        let facet = field(&record, idx_facet).and_then(|raw| raw.parse::<Facet>().ok());
        let parent_ids = field(&record, idx_parents)
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        entries.push(SkillEntry {
            name,
            skill_id: field(&record, idx_id),
            category,
            base_cost,
            score,
            facet,
            parent_ids,
            lower_id: field(&record, idx_lower),
        });
    }
    Ok(entries)
}
