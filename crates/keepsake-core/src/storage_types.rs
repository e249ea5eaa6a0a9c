use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Which adapter holds the bytes of a media record. Persisted per record so
/// deletes and reads keep working after the active backend is switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "storage_backend", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under the uploads directory
    Local,
    /// Bytes carried inside the metadata record
    Inline,
    /// Third-party media host reached over HTTP
    Remote,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "disk" => Ok(StorageBackend::Local),
            "inline" | "blob" => Ok(StorageBackend::Inline),
            "remote" => Ok(StorageBackend::Remote),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Inline => write!(f, "inline"),
            StorageBackend::Remote => write!(f, "remote"),
        }
    }
}
