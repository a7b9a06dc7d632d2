use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::history::migrations::BASE_MIGRATION;
use crate::planner::{PlanResult, ScoringMode};

/// One archived planning run: the inputs that produced it plus the full
/// plan, stored as JSON so older rows survive schema additions.
#[derive(Debug, Clone)]
pub struct PlanRecord {
    pub captured_at: DateTime<Utc>,
    pub catalog_hash: String,
    pub mode: ScoringMode,
    pub rows_text: String,
    pub plan: PlanResult,
}

impl PlanRecord {
    pub fn new(catalog_hash: String, mode: ScoringMode, rows_text: String, plan: PlanResult) -> Self {
        Self {
            captured_at: Utc::now(),
            catalog_hash,
            mode,
            rows_text,
            plan,
        }
    }
}

pub struct PlanStore {
    conn: Connection,
}

impl PlanStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    pub fn insert_plan(&self, record: &PlanRecord) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO plan_history(
    captured_at, catalog_hash, budget, mode, feasible,
    used_cost, total_rating, total_aptitude, rows_text, plan_json
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
"#,
            params![
                record.captured_at.to_rfc3339(),
                record.catalog_hash,
                record.plan.budget as i64,
                record.mode.as_slug(),
                if record.plan.feasible { 1 } else { 0 },
                record.plan.used_cost as i64,
                record.plan.total_rating as i64,
                record.plan.total_aptitude as i64,
                record.rows_text,
                serde_json::to_string(&record.plan)?
            ],
        )?;
        Ok(())
    }

    pub fn load_recent(&self, limit: usize) -> Result<Vec<PlanRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT captured_at, catalog_hash, mode, rows_text, plan_json
FROM plan_history
ORDER BY id DESC
LIMIT ?1
"#,
        )?;
        let rows = stmt
            .query_map(params![limit as i64], row_to_plan_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn latest(&self) -> Result<Option<PlanRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT captured_at, catalog_hash, mode, rows_text, plan_json
FROM plan_history
ORDER BY id DESC
LIMIT 1
"#,
        )?;
        let result = stmt.query_row([], row_to_plan_record);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn row_to_plan_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlanRecord> {
    let captured_at_raw: String = row.get(0)?;
    let captured_at = DateTime::parse_from_rfc3339(&captured_at_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    let mode_raw: String = row.get(2)?;
    let mode = mode_raw.parse::<ScoringMode>().unwrap_or_default();
    let plan_json: String = row.get(4)?;
    let plan: PlanResult = serde_json::from_str(&plan_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(PlanRecord {
        captured_at,
        catalog_hash: row.get(1)?,
        mode,
        rows_text: row.get(3)?,
        plan,
    })
}
