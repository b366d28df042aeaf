/// Catalog identifiers for monitored plants are opaque document ids.
pub type SubjectId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
