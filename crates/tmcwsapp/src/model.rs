//! # Domain Model: Exercise Records
//!
//! An exercise is identified by a server-assigned integer id and lives in one of two places on
//! disk, depending on its [`ExerciseStatus`]:
//!
//! ```text
//! Open    → <exercises_root>/<organization>/<course>/<name>   (canonical path)
//! Closed  → <closed_root>/<id>                               (staging path)
//! Missing → nowhere; the open folder vanished behind our back
//! ```
//!
//! The canonical path is stored on the record so that the index can answer path lookups
//! without recomputing it, but it is always derivable from the identity triple
//! (see [`crate::paths`]).
//!
//! ## Legacy Data
//!
//! The first storage format kept the status as an integer (`0` = open, `1` = closed,
//! `2` = missing) and did not store the path. [`ExerciseRecord`] deserializes both shapes:
//! integer statuses are mapped on the fly and a missing path is left empty, to be re-derived by
//! [`crate::index::ExerciseIndex`] on load. An integer outside that range is an
//! [`TmcError::UnsupportedState`](crate::error::TmcError::UnsupportedState).

use crate::error::{Result, TmcError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStatus {
    Open,
    Closed,
    Missing,
}

impl ExerciseStatus {
    /// Maps the integer encoding used by the version 0 storage format.
    pub fn from_legacy(value: u64) -> Result<Self> {
        match value {
            0 => Ok(Self::Open),
            1 => Ok(Self::Closed),
            2 => Ok(Self::Missing),
            other => Err(TmcError::UnsupportedState(format!(
                "legacy exercise status {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for ExerciseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseStatus {
    type Err = TmcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "missing" => Ok(Self::Missing),
            other => Err(TmcError::UnsupportedState(format!(
                "exercise status {other:?}"
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Name(String),
    Legacy(u64),
}

impl<'de> Deserialize<'de> for ExerciseStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let parsed = match StatusRepr::deserialize(deserializer)? {
            StatusRepr::Name(name) => name.parse(),
            StatusRepr::Legacy(value) => ExerciseStatus::from_legacy(value),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// The identifying fields an exercise arrives with when it is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseIdentity {
    pub id: u64,
    pub name: String,
    pub course: String,
}

impl ExerciseIdentity {
    pub fn new(id: u64, course: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            course: course.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseRecord {
    pub id: u64,
    pub name: String,
    pub course: String,
    pub organization: String,
    pub path: PathBuf,
    pub checksum: String,
    pub status: ExerciseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl ExerciseRecord {
    pub fn is_open(&self) -> bool {
        self.status == ExerciseStatus::Open
    }

    /// True once the hard deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn identity(&self) -> ExerciseIdentity {
        ExerciseIdentity::new(self.id, self.course.clone(), self.name.clone())
    }
}

// Accepts both the current format and version 0 records that carry no path.
impl<'de> Deserialize<'de> for ExerciseRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let helper = RecordHelper::deserialize(deserializer)?;

        Ok(ExerciseRecord {
            id: helper.id,
            name: helper.name,
            course: helper.course,
            organization: helper.organization,
            path: helper.path.unwrap_or_default(),
            checksum: helper.checksum,
            status: helper.status,
            soft_deadline: helper.soft_deadline,
            deadline: helper.deadline,
        })
    }
}

#[derive(Deserialize)]
struct RecordHelper {
    id: u64,
    name: String,
    course: String,
    organization: String,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    checksum: String,
    status: ExerciseStatus,
    #[serde(default)]
    soft_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ExerciseStatus::Missing).unwrap();
        assert_eq!(json, "\"missing\"");
    }

    #[test]
    fn status_accepts_legacy_integers() {
        let status: ExerciseStatus = serde_json::from_str("1").unwrap();
        assert_eq!(status, ExerciseStatus::Closed);
    }

    #[test]
    fn status_rejects_unknown_legacy_value() {
        let result: std::result::Result<ExerciseStatus, _> = serde_json::from_str("7");
        assert!(result.is_err());
        assert!(matches!(
            ExerciseStatus::from_legacy(7),
            Err(TmcError::UnsupportedState(_))
        ));
    }

    #[test]
    fn legacy_record_without_path_deserializes() {
        let json = r#"{
            "id": 1337,
            "name": "hello-world",
            "course": "intro",
            "organization": "HY",
            "checksum": "abc",
            "status": 0
        }"#;
        let record: ExerciseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, ExerciseStatus::Open);
        assert!(record.path.as_os_str().is_empty());
        assert!(record.deadline.is_none());
    }

    #[test]
    fn expiry_uses_hard_deadline() {
        let now = Utc::now();
        let mut record = ExerciseRecord {
            id: 1,
            name: "a".into(),
            course: "c".into(),
            organization: "o".into(),
            path: PathBuf::from("/tmp/o/c/a"),
            checksum: String::new(),
            status: ExerciseStatus::Closed,
            soft_deadline: Some(now - Duration::days(2)),
            deadline: None,
        };
        assert!(!record.is_expired(now));

        record.deadline = Some(now - Duration::hours(1));
        assert!(record.is_expired(now));

        record.deadline = Some(now + Duration::hours(1));
        assert!(!record.is_expired(now));
    }
}
