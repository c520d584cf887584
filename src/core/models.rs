//! Mission entities, insert payloads and join views.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Processing state of a mission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Entered,
    InOperation,
    Completed,
    Canceled,
    Deleted,
}

impl TaskStatus {
    /// Parse a string into a TaskStatus.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "entered" => Ok(TaskStatus::Entered),
            "in_operation" => Ok(TaskStatus::InOperation),
            "completed" => Ok(TaskStatus::Completed),
            "canceled" => Ok(TaskStatus::Canceled),
            "deleted" => Ok(TaskStatus::Deleted),
            _ => Err(crate::error::Error::InvalidStatus(s.to_string())),
        }
    }

    /// Convert to string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Entered => "entered",
            TaskStatus::InOperation => "in_operation",
            TaskStatus::Completed => "completed",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Deleted => "deleted",
        }
    }
}

/// Outcome of the mission itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Success,
    Loss,
    Running,
}

impl MissionStatus {
    /// Parse a string into a MissionStatus.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "success" => Ok(MissionStatus::Success),
            "loss" => Ok(MissionStatus::Loss),
            "running" => Ok(MissionStatus::Running),
            _ => Err(crate::error::Error::InvalidStatus(s.to_string())),
        }
    }

    /// Convert to string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Success => "success",
            MissionStatus::Loss => "loss",
            MissionStatus::Running => "running",
        }
    }
}

macro_rules! label_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = crate::error::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                Self::parse(s)
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                Self::parse(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

label_impls!(TaskStatus);
label_impls!(MissionStatus);

/// A named surface feature of Mars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographicalObject {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub feature: String,
    pub size: Option<i64>,
    pub describe: Option<String>,
    pub url_photo: Option<String>,
    /// Availability flag, not a mission status.
    pub status: bool,
}

impl GeographicalObject {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("type")?,
            feature: row.get("feature")?,
            size: row.get("size")?,
            describe: row.get("describe")?,
            url_photo: row.get("url_photo")?,
            status: row.get("status")?,
        })
    }
}

/// A lander, rover or other vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transport {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub describe: Option<String>,
    pub url_photo: Option<String>,
}

impl Transport {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            kind: row.get("type")?,
            describe: row.get("describe")?,
            url_photo: row.get("url_photo")?,
        })
    }
}

/// A mission request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarsStation {
    pub id: i64,
    pub type_status: String,
    pub data_create: NaiveDate,
    pub data_from: NaiveDate,
    pub data_close: NaiveDate,
    pub id_scientist: i64,
    pub id_transport: i64,
    pub id_status: i64,
}

impl MarsStation {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            type_status: row.get("type_status")?,
            data_create: row.get("data_create")?,
            data_from: row.get("data_from")?,
            data_close: row.get("data_close")?,
            id_scientist: row.get("id_scientist")?,
            id_transport: row.get("id_transport")?,
            id_status: row.get("id_status")?,
        })
    }
}

/// Task and mission labels attached to a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub id: i64,
    pub status_task: TaskStatus,
    pub status_mission: MissionStatus,
}

impl Status {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            status_task: row.get("status_task")?,
            status_mission: row.get("status_mission")?,
        })
    }
}

/// Account with login credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub admin: bool,
}

impl User {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            login: row.get("login")?,
            password_hash: row.get("password")?,
            admin: row.get("admin")?,
        })
    }
}

/// Payload for a new geographical object.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeographicalObject {
    pub kind: String,
    pub feature: String,
    pub size: Option<i64>,
    pub describe: Option<String>,
    pub url_photo: Option<String>,
    pub status: bool,
}

/// Payload for a new transport.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransport {
    pub name: String,
    pub kind: String,
    pub describe: Option<String>,
    pub url_photo: Option<String>,
}

/// Payload for a new station.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMarsStation {
    pub type_status: String,
    pub data_create: NaiveDate,
    pub data_from: NaiveDate,
    pub data_close: NaiveDate,
    pub id_scientist: i64,
    pub id_transport: i64,
    pub id_status: i64,
}

/// Payload linking an object to a station.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub id_geographical_object: i64,
    pub id_mars_station: i64,
    pub purpose: Option<String>,
    pub results: Option<String>,
}

/// Payload for a new status pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewStatus {
    pub status_task: TaskStatus,
    pub status_mission: MissionStatus,
}

/// Payload for a new scientist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScientist {
    pub full_name: String,
    pub post: String,
    pub name_organization: String,
    pub address: Option<String>,
    pub id_user: i64,
}

/// Payload for a new user. The password is hashed before storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub admin: bool,
}

/// One row of the location join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub id: i64,
    pub feature: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub transport_name: String,
    pub transport_type: String,
    pub purpose: Option<String>,
    pub results: Option<String>,
    pub status_mission: MissionStatus,
    pub status_task: TaskStatus,
}

impl LocationSummary {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("l_id")?,
            feature: row.get("go_feature")?,
            kind: row.get("go_type")?,
            transport_name: row.get("t_name")?,
            transport_type: row.get("t_type")?,
            purpose: row.get("l_purpose")?,
            results: row.get("l_results")?,
            status_mission: row.get("status_mission")?,
            status_task: row.get("status_task")?,
        })
    }
}

/// One row of the location join for a single object, with the transport photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDetail {
    pub l_id: i64,
    pub go_feature: String,
    pub go_type: String,
    pub t_name: String,
    pub t_type: String,
    pub t_url_photo: Option<String>,
    pub l_purpose: Option<String>,
    pub l_results: Option<String>,
    pub status_mission: MissionStatus,
    pub status_task: TaskStatus,
}

impl LocationDetail {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            l_id: row.get("l_id")?,
            go_feature: row.get("go_feature")?,
            go_type: row.get("go_type")?,
            t_name: row.get("t_name")?,
            t_type: row.get("t_type")?,
            t_url_photo: row.get("t_url_photo")?,
            l_purpose: row.get("l_purpose")?,
            l_results: row.get("l_results")?,
            status_mission: row.get("status_mission")?,
            status_task: row.get("status_task")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_parse() {
        assert_eq!(TaskStatus::parse("entered").unwrap(), TaskStatus::Entered);
        assert_eq!(
            TaskStatus::parse("in_operation").unwrap(),
            TaskStatus::InOperation
        );
        assert_eq!(TaskStatus::parse("deleted").unwrap(), TaskStatus::Deleted);
        assert!(TaskStatus::parse("launched").is_err());
    }

    #[test]
    fn test_mission_status_round_trips_through_str() {
        for status in [
            MissionStatus::Success,
            MissionStatus::Loss,
            MissionStatus::Running,
        ] {
            assert_eq!(status.as_str().parse::<MissionStatus>().unwrap(), status);
        }
        assert!("lost".parse::<MissionStatus>().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", TaskStatus::InOperation), "in_operation");
        assert_eq!(format!("{}", MissionStatus::Running), "running");
    }

    #[test]
    fn test_status_column_decoding() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let task: TaskStatus = conn
            .query_row("SELECT 'canceled'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(task, TaskStatus::Canceled);

        let bad = conn.query_row("SELECT 'unknown'", [], |r| r.get::<_, MissionStatus>(0));
        assert!(bad.is_err());
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let user = User {
            id: 1,
            login: "user001".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            admin: false,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["login"], "user001");
    }

    #[test]
    fn test_geographical_object_serializes_type_field() {
        let object = GeographicalObject {
            id: 3,
            kind: "Tholus, tholi".to_string(),
            feature: "Albor Tholus".to_string(),
            size: Some(170),
            describe: None,
            url_photo: None,
            status: true,
        };
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["type"], "Tholus, tholi");
        assert_eq!(json["status"], true);
    }
}
