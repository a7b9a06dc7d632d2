pub mod loader;
pub mod schema;

pub use loader::{load_catalog, load_catalog_with_costs, CostMapEntry};
pub use schema::{
    normalize_key, normalize_name, AffinityBucket, AffinityGrade, AffinityGrades, Category, Facet,
    ScoreTable, SkillCatalog, SkillEntry,
};
