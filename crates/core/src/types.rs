/// Task and model identifiers are UUID v4 strings, opaque to callers.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
