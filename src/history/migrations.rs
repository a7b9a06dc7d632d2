pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS plan_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    captured_at TEXT NOT NULL,
    catalog_hash TEXT NOT NULL,
    budget INTEGER NOT NULL,
    mode TEXT NOT NULL,
    feasible INTEGER NOT NULL,
    used_cost INTEGER NOT NULL,
    total_rating INTEGER NOT NULL,
    total_aptitude INTEGER NOT NULL,
    rows_text TEXT NOT NULL,
    plan_json TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_plan_history_captured
    ON plan_history(captured_at DESC);
"#;
