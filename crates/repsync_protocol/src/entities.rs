//! Typed entity payloads and payload normalization.
//!
//! A `create` runs the raw payload through the typed struct for its
//! kind: dates are parsed, optional numeric fields are defaulted, and
//! unknown keys are dropped. An `update` is a field-level patch, so it
//! keeps only the keys the client actually submitted (minus the
//! `version` control field, which is storage metadata, never data).

use crate::ids::EntityId;
use crate::operation::EntityKind;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while interpreting an operation payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The payload was not a JSON object.
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// The payload did not match the entity's schema.
    #[error("invalid {kind} payload: {message}")]
    Invalid {
        /// Entity kind being normalized.
        kind: &'static str,
        /// What was wrong.
        message: String,
    },
}

/// Fields of a planned workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutFields {
    /// Display name, e.g. "Leg Day".
    pub name: String,
    /// When the session is scheduled for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Planned duration in minutes.
    #[serde(default)]
    pub duration_minutes: u32,
    /// Free-form coach or client notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whether the client marked the session done.
    #[serde(default)]
    pub completed: bool,
}

/// Fields of an exercise within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseFields {
    /// Exercise name, e.g. "Back Squat".
    pub name: String,
    /// Owning workout, if the client linked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<EntityId>,
    /// Position within the workout.
    #[serde(default)]
    pub position: u32,
    /// Rest between sets, in seconds.
    #[serde(default)]
    pub rest_seconds: u32,
    /// Prescribed number of sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sets: Option<u32>,
}

/// Fields of a set within an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFields {
    /// Owning exercise, if the client linked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<EntityId>,
    /// Repetitions performed.
    #[serde(default)]
    pub reps: u32,
    /// Load in kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Rate of perceived exertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    /// Whether the set was completed.
    #[serde(default)]
    pub completed: bool,
}

/// Profile fields a user may overwrite on their own record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileFields {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// IANA timezone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn through<T>(kind: EntityKind, payload: &Value) -> Result<Value, PayloadError>
where
    T: DeserializeOwned + Serialize,
{
    let typed: T = serde_json::from_value(payload.clone()).map_err(|e| PayloadError::Invalid {
        kind: kind.as_str(),
        message: e.to_string(),
    })?;
    serde_json::to_value(typed).map_err(|e| PayloadError::Invalid {
        kind: kind.as_str(),
        message: e.to_string(),
    })
}

/// Normalizes a create payload through the typed struct for `kind`.
///
/// # Errors
///
/// Returns `PayloadError` if the payload is not an object or does not
/// match the entity's schema (e.g. an unparseable date).
pub fn normalize_create(kind: EntityKind, payload: &Value) -> Result<Value, PayloadError> {
    if !payload.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    match kind {
        EntityKind::Workout => through::<WorkoutFields>(kind, payload),
        EntityKind::Exercise => through::<ExerciseFields>(kind, payload),
        EntityKind::Set => through::<SetFields>(kind, payload),
        EntityKind::User => through::<UserProfileFields>(kind, payload),
    }
}

/// Extracts the field-level changes of an update payload.
///
/// Returns the submitted keys with the `version` control field
/// removed. Keys absent from the payload are left untouched on the
/// stored record.
///
/// # Errors
///
/// Returns `PayloadError::NotAnObject` for non-object payloads.
pub fn update_changes(payload: &Value) -> Result<Map<String, Value>, PayloadError> {
    let mut changes = payload
        .as_object()
        .cloned()
        .ok_or(PayloadError::NotAnObject)?;
    changes.remove("version");
    Ok(changes)
}

/// Reads the version the client last observed, if the payload carries
/// one.
#[must_use]
pub fn submitted_version(payload: &Value) -> Option<u64> {
    payload.get("version").and_then(Value::as_u64)
}
