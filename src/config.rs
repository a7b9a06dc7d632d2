use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::AffinityGrades;
use crate::planner::ScoringMode;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub affinity: AffinityGrades,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Catalog file (`.csv` or `.json`).
    #[serde(default)]
    pub path: String,
    /// Optional JSON cost map merged over the catalog; its costs win.
    #[serde(default)]
    pub cost_map: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_budget")]
    pub budget: u32,
    #[serde(default)]
    pub mode: ScoringMode,
    #[serde(default)]
    pub fast_learner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<String>,
    pub cost_map: Option<String>,
    pub budget: Option<u32>,
    pub mode: Option<ScoringMode>,
    pub fast_learner: Option<bool>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/skill-planner/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.catalog_path {
            self.catalog.path = path;
        }
        if let Some(cost_map) = overrides.cost_map {
            self.catalog.cost_map = Some(cost_map);
        }
        if let Some(budget) = overrides.budget {
            self.planner.budget = budget;
        }
        if let Some(mode) = overrides.mode {
            self.planner.mode = mode;
        }
        if let Some(fast_learner) = overrides.fast_learner {
            self.planner.fast_learner = fast_learner;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_catalog_path(&self) -> PathBuf {
        expand_tilde(&self.catalog.path)
    }

    pub fn resolved_cost_map_path(&self) -> Option<PathBuf> {
        self.catalog.cost_map.as_deref().map(expand_tilde)
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn default_template() -> String {
        let template = r#"[catalog]
path = "~/.local/share/skill-planner/skills.csv"
# cost_map = "~/.local/share/skill-planner/costs.json"

[planner]
budget = 1200
mode = "rating"          # rating | aptitude
fast_learner = false

[affinity]
turf = "A"
dirt = "G"
sprint = "A"
mile = "A"
medium = "A"
long = "A"
front = "A"
pace = "A"
late = "A"
end = "A"

[storage]
db_path = "~/.local/share/skill-planner/plans.db"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            mode: ScoringMode::default(),
            fast_learner: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_budget() -> u32 {
    1200
}

fn default_db_path() -> String {
    "~/.local/share/skill-planner/plans.db".to_string()
}
