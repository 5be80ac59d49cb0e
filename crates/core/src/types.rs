/// Markers are keyed by UUID in the row store.
pub type MarkerId = uuid::Uuid;

/// User ids come from the hosted auth service (`sub` claim).
pub type UserId = uuid::Uuid;

/// Category ids are opaque text keys.
pub type CategoryId = String;

/// Brand ids are opaque text keys.
pub type BrandId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
