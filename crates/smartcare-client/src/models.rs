//! Wire types for the SmartCare API.
//!
//! Every record is a flat JSON object with camelCase keys and a numeric
//! identity. `Insert*` types are create bodies; `*Patch` types are partial
//! update bodies whose absent fields are left out of the JSON entirely.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Numeric identity shared by every record.
pub type EntityId = i64;

/// Records addressable by numeric identity.
pub trait Identified {
    fn id(&self) -> EntityId;
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> EntityId {
                self.id
            }
        })*
    };
}

// =============================================================================
// Users
// =============================================================================

/// Role tag carried by every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Hospital director.
    Director,
    /// Ward nurse.
    Nurse,
    Patient,
    Guardian,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Director => "director",
            Self::Nurse => "nurse",
            Self::Patient => "patient",
            Self::Guardian => "guardian",
        }
    }

    /// Roles allowed on staff-only pages.
    pub const STAFF: &'static [UserRole] = &[UserRole::Director, UserRole::Nurse];
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "director" => Ok(Self::Director),
            "nurse" => Ok(Self::Nurse),
            "patient" => Ok(Self::Patient),
            "guardian" => Ok(Self::Guardian),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated identity as returned by `/api/user`, `/api/login` and `/api/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

/// Registration body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
}

/// Login body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Rooms and environment
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub temp_threshold: Option<f64>,
    #[serde(default)]
    pub humidity_threshold: Option<f64>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub current_temp: Option<f64>,
    #[serde(default)]
    pub current_humidity: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRoom {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

/// Sensor reading for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvLog {
    pub id: EntityId,
    #[serde(default)]
    pub room_id: Option<EntityId>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default)]
    pub alert: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertEnvLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvLogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<bool>,
}

// =============================================================================
// Patients and guardians
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: EntityId,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub blood: Option<String>,
    #[serde(default)]
    pub room_id: Option<EntityId>,
    #[serde(default)]
    pub bed_number: Option<i32>,
    #[serde(default)]
    pub fall_risk: Option<String>,
    #[serde(default)]
    pub assigned_nurse_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    pub name: String,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fall_risk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_nurse_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fall_risk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_nurse_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub id: EntityId,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub patient_id: Option<EntityId>,
    pub name: String,
    pub tel: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertGuardian {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<EntityId>,
    pub name: String,
    pub tel: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
}

// =============================================================================
// Fall accidents
// =============================================================================

/// Fall accident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accident {
    pub id: EntityId,
    #[serde(default)]
    pub patient_id: Option<EntityId>,
    #[serde(default)]
    pub room_id: Option<EntityId>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub notified: Option<bool>,
    #[serde(default)]
    pub resolved: Option<bool>,
    #[serde(default)]
    pub resolved_by: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAccident {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<EntityId>,
}

// =============================================================================
// Cameras
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: EntityId,
    #[serde(default)]
    pub room_id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertCamera {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// =============================================================================
// Messages
// =============================================================================

/// Message between a guardian and ward staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: EntityId,
    #[serde(default)]
    pub sender_id: Option<EntityId>,
    #[serde(default)]
    pub receiver_id: Option<EntityId>,
    pub message: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default)]
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<EntityId>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

identified!(User, Room, EnvLog, Patient, Guardian, Accident, Camera, Message);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_user_from_server_payload() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "username": "a",
            "role": "nurse",
            "name": "A"
        }))
        .unwrap();
        assert_eq!(user.role, UserRole::Nurse);
        assert_eq!(user.preferred_language, None);
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_patch_omits_absent_fields() {
        let patch = PatientPatch {
            fall_risk: Some("high".into()),
            ..Default::default()
        };
        assert_json_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "fallRisk": "high" })
        );
    }

    #[test]
    fn test_accident_timestamps() {
        let accident: Accident = serde_json::from_value(json!({
            "id": 7,
            "patientId": 3,
            "date": "2025-03-01T09:30:00Z",
            "resolved": false
        }))
        .unwrap();
        assert_eq!(accident.patient_id, Some(3));
        assert_eq!(accident.date.map(|d| d.hour()), Some(9));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Director".parse::<UserRole>(), Ok(UserRole::Director));
        assert!("admin".parse::<UserRole>().is_err());
        assert!(UserRole::STAFF.contains(&UserRole::Nurse));
        assert!(!UserRole::STAFF.contains(&UserRole::Guardian));
    }
}
