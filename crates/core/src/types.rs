/// Assets are addressed by random UUIDs, minted at creation time.
pub type AssetId = uuid::Uuid;

/// Versions are addressed by random UUIDs, minted at submission time.
pub type VersionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
