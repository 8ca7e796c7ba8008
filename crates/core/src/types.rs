/// All database primary keys are PostgreSQL UUIDs, exposed as opaque strings.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
