use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account roles, ordered by authority level.
///
/// This is the single authoritative definition of the hierarchy. Every
/// component (guards, promotion engine, permission display) reads levels
/// and promotion rules from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    CollegeManagement,
    CollegeAdmin,
    MainAdmin,
}

impl Role {
    /// Hierarchy level (higher number = more authority).
    pub const fn level(self) -> u8 {
        match self {
            Role::Student => 1,
            Role::Faculty => 2,
            Role::CollegeManagement => 3,
            Role::CollegeAdmin => 4,
            Role::MainAdmin => 5,
        }
    }

    /// True if this role's level is at least `minimum`'s level.
    pub fn meets(self, minimum: Role) -> bool {
        self.level() >= minimum.level()
    }

    /// True if this role strictly outranks `other`. Equal level does not count.
    pub fn outranks(self, other: Role) -> bool {
        self.level() > other.level()
    }

    /// Roles this role may assign to a target during promotion.
    ///
    /// `main_admin` never appears in any set: that role is seeded
    /// out-of-band and is unassignable through the promotion path.
    pub const fn promotable_roles(self) -> &'static [Role] {
        match self {
            Role::MainAdmin => &[
                Role::CollegeAdmin,
                Role::CollegeManagement,
                Role::Faculty,
                Role::Student,
            ],
            Role::CollegeAdmin => &[Role::CollegeManagement, Role::Faculty, Role::Student],
            Role::CollegeManagement => &[Role::Faculty, Role::Student],
            Role::Faculty | Role::Student => &[],
        }
    }

    pub fn can_promote_to(self, target: Role) -> bool {
        self.promotable_roles().contains(&target)
    }

    /// Roles that appear in this role's manageable-users view.
    ///
    /// Advisory projection only; mutating operations re-check authorization
    /// independently.
    pub const fn manageable_roles(self) -> &'static [Role] {
        match self {
            Role::MainAdmin => &[
                Role::MainAdmin,
                Role::CollegeAdmin,
                Role::CollegeManagement,
                Role::Faculty,
                Role::Student,
            ],
            Role::CollegeAdmin => &[Role::CollegeManagement, Role::Faculty, Role::Student],
            Role::CollegeManagement => &[Role::Faculty, Role::Student],
            Role::Faculty | Role::Student => &[],
        }
    }

    /// Capability tags shown to the client for this role.
    ///
    /// Display-only: enforcement happens in the guards and the promotion
    /// engine, never by consulting this list.
    pub const fn permissions(self) -> &'static [&'static str] {
        match self {
            Role::Student => &[
                "view_events",
                "register_events",
                "join_clubs",
                "view_opportunities",
                "share_resources",
                "use_marketplace",
                "use_lost_found",
            ],
            Role::Faculty => &[
                "view_events",
                "register_events",
                "join_clubs",
                "approve_clubs",
                "view_opportunities",
                "share_resources",
                "use_marketplace",
                "use_lost_found",
            ],
            Role::CollegeManagement => &[
                "view_events",
                "register_events",
                "join_clubs",
                "approve_clubs",
                "create_opportunities",
                "view_opportunities",
                "share_resources",
                "use_marketplace",
                "use_lost_found",
                "promote_to_faculty",
            ],
            Role::CollegeAdmin => &[
                "full_college_control",
                "promote_to_college_management",
                "promote_to_faculty",
                "manage_college_clubs",
                "manage_college_events",
                "manage_college_opportunities",
                "manage_college_users",
            ],
            Role::MainAdmin => &[
                "full_system_control",
                "promote_to_college_admin",
                "promote_to_college_management",
                "promote_to_faculty",
                "manage_all_colleges",
                "view_system_stats",
            ],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::CollegeManagement => "college_management",
            Role::CollegeAdmin => "college_admin",
            Role::MainAdmin => "main_admin",
        }
    }

    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Faculty,
        Role::CollegeManagement,
        Role::CollegeAdmin,
        Role::MainAdmin,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "college_management" => Ok(Role::CollegeManagement),
            "college_admin" => Ok(Role::CollegeAdmin),
            "main_admin" => Ok(Role::MainAdmin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}
