use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

/// Tier tag for a skill. `Gold` is the premium tier: a gold skill upgrades a
/// lower (ordinary) version and subsumes its score when both are owned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Gold,
    Yellow,
    Blue,
    Green,
    Red,
    Purple,
    Unique,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Gold,
        Category::Yellow,
        Category::Blue,
        Category::Green,
        Category::Red,
        Category::Purple,
        Category::Unique,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Unique => "unique",
        }
    }

    /// Premium skills follow the upgrade pattern: they have a lower version
    /// whose score they replace entirely.
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Gold)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Gold => "Gold",
            Self::Yellow => "Yellow",
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Red => "Red",
            Self::Purple => "Purple",
            Self::Unique => "Unique",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown skill category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "gold" | "golden" => Ok(Self::Gold),
            "yellow" => Ok(Self::Yellow),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "red" => Ok(Self::Red),
            "purple" => Ok(Self::Purple),
            "unique" | "ius" => Ok(Self::Unique),
            other if other.contains("gold") => Ok(Self::Gold),
            other if other.contains("ius") => Ok(Self::Unique),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

/// Track or running-style facet a bucketed score table is keyed by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Turf,
    Dirt,
    Sprint,
    Mile,
    Medium,
    Long,
    Front,
    Pace,
    Late,
    End,
}

impl Facet {
    pub const ALL: [Facet; 10] = [
        Facet::Turf,
        Facet::Dirt,
        Facet::Sprint,
        Facet::Mile,
        Facet::Medium,
        Facet::Long,
        Facet::Front,
        Facet::Pace,
        Facet::Late,
        Facet::End,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Turf => "turf",
            Self::Dirt => "dirt",
            Self::Sprint => "sprint",
            Self::Mile => "mile",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::Front => "front",
            Self::Pace => "pace",
            Self::Late => "late",
            Self::End => "end",
        }
    }
}

impl Display for Facet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown affinity facet: {0}")]
pub struct FacetParseError(pub String);

impl FromStr for Facet {
    type Err = FacetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let facet = match normalized.as_str() {
            "turf" => Facet::Turf,
            "dirt" => Facet::Dirt,
            "sprint" => Facet::Sprint,
            "mile" => Facet::Mile,
            "medium" => Facet::Medium,
            "long" => Facet::Long,
            "front" => Facet::Front,
            "pace" => Facet::Pace,
            "late" => Facet::Late,
            "end" => Facet::End,
            _ => return Err(FacetParseError(s.to_string())),
        };
        Ok(facet)
    }
}

/// Letter grade the caller holds for a facet. Resolved to a score bucket
/// before extraction; the planner core never sees grades.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AffinityGrade {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl AffinityGrade {
    pub fn bucket(&self) -> AffinityBucket {
        match self {
            Self::S | Self::A => AffinityBucket::Good,
            Self::B | Self::C => AffinityBucket::Average,
            Self::D | Self::E | Self::F => AffinityBucket::Bad,
            Self::G => AffinityBucket::Terrible,
        }
    }
}

impl Default for AffinityGrade {
    fn default() -> Self {
        Self::A
    }
}

#[derive(Debug, Error)]
#[error("unknown affinity grade: {0}")]
pub struct GradeParseError(pub String);

impl FromStr for AffinityGrade {
    type Err = GradeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            "F" => Ok(Self::F),
            "G" => Ok(Self::G),
            _ => Err(GradeParseError(s.to_string())),
        }
    }
}

impl Display for AffinityGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AffinityBucket {
    Good,
    Average,
    Bad,
    Terrible,
}

/// Rating value of a skill: either a flat number or a table keyed by the
/// bucket of the caller's grade for the skill's facet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScoreTable {
    Flat(u32),
    Bucketed {
        base: u32,
        good: u32,
        average: u32,
        bad: u32,
        terrible: u32,
    },
}

impl ScoreTable {
    /// `None` means the skill has no facet; the base value applies.
    pub fn resolve(&self, bucket: Option<AffinityBucket>) -> u32 {
        match self {
            Self::Flat(v) => *v,
            Self::Bucketed {
                base,
                good,
                average,
                bad,
                terrible,
            } => match bucket {
                None => *base,
                Some(AffinityBucket::Good) => *good,
                Some(AffinityBucket::Average) => *average,
                Some(AffinityBucket::Bad) => *bad,
                Some(AffinityBucket::Terrible) => *terrible,
            },
        }
    }
}

/// Per-facet grades held by the caller. Collapses a bucketed score table to
/// a single number ahead of candidate extraction.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AffinityGrades {
    #[serde(default)]
    pub turf: AffinityGrade,
    #[serde(default)]
    pub dirt: AffinityGrade,
    #[serde(default)]
    pub sprint: AffinityGrade,
    #[serde(default)]
    pub mile: AffinityGrade,
    #[serde(default)]
    pub medium: AffinityGrade,
    #[serde(default)]
    pub long: AffinityGrade,
    #[serde(default)]
    pub front: AffinityGrade,
    #[serde(default)]
    pub pace: AffinityGrade,
    #[serde(default)]
    pub late: AffinityGrade,
    #[serde(default)]
    pub end: AffinityGrade,
}

impl AffinityGrades {
    pub fn grade(&self, facet: Facet) -> AffinityGrade {
        match facet {
            Facet::Turf => self.turf,
            Facet::Dirt => self.dirt,
            Facet::Sprint => self.sprint,
            Facet::Mile => self.mile,
            Facet::Medium => self.medium,
            Facet::Long => self.long,
            Facet::Front => self.front,
            Facet::Pace => self.pace,
            Facet::Late => self.late,
            Facet::End => self.end,
        }
    }

    pub fn bucket(&self, facet: Option<Facet>) -> Option<AffinityBucket> {
        facet.map(|f| self.grade(f).bucket())
    }
}

/// One catalog row. `parent_ids` and `lower_id` are raw cross-references
/// into the catalog; they become typed candidate edges during extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub skill_id: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub base_cost: Option<u32>,
    pub score: ScoreTable,
    #[serde(default)]
    pub facet: Option<Facet>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub lower_id: Option<String>,
}

/// Immutable catalog snapshot. Built once per load; lookups go through
/// prebuilt name/id indexes so nothing re-resolves by string during a solve.
#[derive(Debug, Clone, Serialize)]
pub struct SkillCatalog {
    pub loaded_at: DateTime<Utc>,
    pub source: String,
    pub entries: Vec<SkillEntry>,
    pub raw_hash: String,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
    #[serde(skip)]
    by_key: HashMap<String, usize>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl SkillCatalog {
    pub fn with_hash(source: impl Into<String>, entries: Vec<SkillEntry>) -> Self {
        let source = source.into();
        let canonical = serde_json::to_string(&entries).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let raw_hash = format!("{:x}", hasher.finalize());

        let mut by_name = HashMap::new();
        let mut by_key = HashMap::new();
        let mut by_id = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_name.entry(normalize_name(&entry.name)).or_insert(idx);
            by_key.entry(normalize_key(&entry.name)).or_insert(idx);
            if let Some(id) = &entry.skill_id {
                by_id.entry(id.clone()).or_insert(idx);
            }
        }

        Self {
            loaded_at: Utc::now(),
            source,
            entries,
            raw_hash,
            by_name,
            by_key,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact normalized name first, then the punctuation-stripped key.
    pub fn find_by_name(&self, name: &str) -> Option<&SkillEntry> {
        self.by_name
            .get(&normalize_name(name))
            .or_else(|| self.by_key.get(&normalize_key(name)))
            .map(|&idx| &self.entries[idx])
    }

    pub fn find_by_id(&self, id: &str) -> Option<&SkillEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn count_by_category(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|cat| {
                (
                    *cat,
                    self.entries.iter().filter(|e| e.category == *cat).count(),
                )
            })
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Punctuation-stripped lookup key: lowercase, alphanumerics and single
/// spaces only. Lets "Go with the Flow!" match "go with the flow".
pub fn normalize_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_space = true;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_space = false;
        } else if (ch == ' ' || ch.is_whitespace()) && !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, category: Category, cost: u32) -> SkillEntry {
        SkillEntry {
            name: name.to_string(),
            skill_id: None,
            category,
            base_cost: Some(cost),
            score: ScoreTable::Flat(cost),
            facet: None,
            parent_ids: Vec::new(),
            lower_id: None,
        }
    }

    #[test]
    fn category_parses_aliases() {
        assert_eq!("golden".parse::<Category>().unwrap(), Category::Gold);
        assert_eq!("ius".parse::<Category>().unwrap(), Category::Unique);
        assert!("mauve".parse::<Category>().is_err());
    }

    #[test]
    fn grade_buckets() {
        assert_eq!(AffinityGrade::S.bucket(), AffinityBucket::Good);
        assert_eq!(AffinityGrade::C.bucket(), AffinityBucket::Average);
        assert_eq!(AffinityGrade::F.bucket(), AffinityBucket::Bad);
        assert_eq!(AffinityGrade::G.bucket(), AffinityBucket::Terrible);
    }

    #[test]
    fn score_table_resolution() {
        let table = ScoreTable::Bucketed {
            base: 508,
            good: 508,
            average: 415,
            bad: 369,
            terrible: 323,
        };
        assert_eq!(table.resolve(None), 508);
        assert_eq!(table.resolve(Some(AffinityBucket::Average)), 415);
        assert_eq!(ScoreTable::Flat(195).resolve(Some(AffinityBucket::Bad)), 195);
    }

    #[test]
    fn normalize_key_strips_punctuation() {
        assert_eq!(normalize_key("Go with the Flow!"), "go with the flow");
        assert_eq!(normalize_key("  Corner   Recovery ○ "), "corner recovery");
    }

    #[test]
    fn catalog_lookup_uses_both_keys() {
        let catalog = SkillCatalog::with_hash(
            "test",
            vec![entry("Professor of Curvature", Category::Gold, 508)],
        );
        assert!(catalog.find_by_name("professor of curvature").is_some());
        assert!(catalog.find_by_name("Professor of Curvature!").is_some());
        assert!(catalog.find_by_name("unknown").is_none());
    }

    #[test]
    fn catalog_hash_is_stable_for_same_entries() {
        let a = SkillCatalog::with_hash("a", vec![entry("X", Category::Blue, 100)]);
        let b = SkillCatalog::with_hash("b", vec![entry("X", Category::Blue, 100)]);
        assert_eq!(a.raw_hash, b.raw_hash);
    }
}
