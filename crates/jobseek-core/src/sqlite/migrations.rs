/// One forward-only schema step. Versions start at 1 and have no gaps; the
/// applied version is tracked in SQLite's `user_version` pragma.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchemaStep {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

const KV_SLOTS: SchemaStep = SchemaStep {
    version: 1,
    name: "kv_slots",
    sql: r#"
CREATE TABLE IF NOT EXISTS kv_slots (
    slot_key TEXT PRIMARY KEY,
    slot_value BLOB NOT NULL,
    updated_at_unix INTEGER NOT NULL
);
"#,
};

const SCHEMA_STEPS: [SchemaStep; 1] = [KV_SLOTS];

pub fn schema_steps() -> &'static [SchemaStep] {
    &SCHEMA_STEPS
}

pub fn latest_schema_version() -> i64 {
    SCHEMA_STEPS.last().map(|step| step.version).unwrap_or(0)
}
