//! Backend user record and the request/response bodies of the user endpoints.
//!
//! Field names follow the backend's JSON (camelCase, `photoURL`, Mongo-style
//! `_id`), so these types serialize to exactly what the REST API expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::identity::Identity;
use crate::roles::Role;
use crate::value_types::{Email, PhoneNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "blocked" => Ok(UserStatus::Blocked),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

/// A user as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: Email,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<PhoneNumber>,
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub upazila: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /add-user`.
///
/// `role` is only applied when the record does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl AddUserRequest {
    /// Upsert payload sent whenever an identity appears: new records start
    /// as active donors.
    pub fn donor_for(identity: &Identity) -> Self {
        Self {
            email: identity.email.clone(),
            name: identity.name_or_email().to_string(),
            role: Role::Donor,
            status: Some(UserStatus::Active),
            photo_url: identity.photo_url.clone(),
        }
    }
}

/// Response of `POST /add-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpsertOutcome {
    Inserted {
        #[serde(rename = "insertedId")]
        inserted_id: String,
    },
    Updated {
        updated: bool,
    },
}

impl UpsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted { .. })
    }
}

/// Response of `GET /get-user-role`. The role is kept raw so the caller
/// decides how to treat values outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleResponse {
    pub role: String,
}

/// Body of `PATCH /users/{email}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfile {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(url(message = "Photo URL must be a valid URL"))]
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    #[validate(length(max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[validate(length(max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upazila: Option<String>,
}

impl BackendUserRecord {
    pub fn apply_profile(&mut self, update: &UpdateUserProfile) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(photo) = &update.photo_url {
            self.photo_url = Some(photo.clone());
        }
        if let Some(phone) = &update.phone_number {
            self.phone_number = Some(phone.clone());
        }
        if let Some(group) = update.blood_group {
            self.blood_group = Some(group);
        }
        if let Some(district) = &update.district {
            self.district = Some(district.clone());
        }
        if let Some(upazila) = &update.upazila {
            self.upazila = Some(upazila.clone());
        }
    }
}

/// Body of `PATCH /update-users/role/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Body of `PATCH /update-users/status/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

/// Query of `GET /get-users`. `status=all` or an empty value means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilterParams {
    #[serde(default, deserialize_with = "deserialize_status_filter")]
    pub status: Option<UserStatus>,
}

pub fn deserialize_status_filter<'de, D>(deserializer: D) -> Result<Option<UserStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
