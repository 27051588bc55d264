pub mod memory;
pub mod postgres;
pub mod seed;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::college;
use crate::roles::Role;

/// A registered account. The authoritative copy of `role` lives in the
/// store; engines re-read it at check time rather than trusting a cached
/// or token-carried value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Derived once at registration from the email domain. May be corrected
    /// by a migration but is never re-derived on read.
    pub college_id: Option<String>,
    pub bio: String,
    pub interests: Vec<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh account at registration time. Role is always
    /// `student`; promotion happens later through the admin engine.
    pub fn register(email: &str, full_name: &str, hashed_password: String) -> Self {
        let email = email.to_lowercase();
        let college_id = college::college_id_from_email(&email);
        Self {
            id: Uuid::new_v4(),
            email,
            full_name: full_name.to_string(),
            role: Role::Student,
            college_id,
            bio: String::new(),
            interests: Vec::new(),
            hashed_password,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            college_id: self.college_id.clone(),
            bio: self.bio.clone(),
            interests: self.interests.clone(),
            created_at: self.created_at,
        }
    }
}

/// Client-facing projection of an account. Never carries the credential
/// hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub college_id: Option<String>,
    pub bio: String,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}
