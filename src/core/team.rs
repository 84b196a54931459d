//! Team roster - who may inspect, manage, and sign off
//!
//! Roles are a closed enumeration; authorization never matches on free-form
//! display labels. A member may additionally carry the administrative flag
//! and an explicit run-creation capability override.

use serde::{Deserialize, Serialize};

use crate::core::project::Project;

/// Roles a team member can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Inspector,
    Quality,
    SiteManager,
    FacilityDirector,
}

impl Role {
    /// Whether this role counts as site management
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::SiteManager | Role::FacilityDirector)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Inspector => write!(f, "inspector"),
            Role::Quality => write!(f, "quality"),
            Role::SiteManager => write!(f, "site_manager"),
            Role::FacilityDirector => write!(f, "facility_director"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inspector" => Ok(Role::Inspector),
            "quality" => Ok(Role::Quality),
            "site_manager" => Ok(Role::SiteManager),
            "facility_director" => Ok(Role::FacilityDirector),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// One roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Identity used for ownership and approval matching (case-insensitive)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub roles: Vec<Role>,

    /// Administrative flag; admins bypass ownership checks
    #[serde(default)]
    pub admin: bool,

    /// Explicit run-creation capability; when absent the managerial
    /// fallback applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_create_runs: Option<bool>,
}

impl Member {
    /// A plain inspector with no extra capabilities
    pub fn inspector(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            roles: vec![Role::Inspector],
            admin: false,
            can_create_runs: None,
        }
    }

    /// Stand-in actor used when no roster is configured: all checks pass
    pub fn unrestricted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            roles: Vec::new(),
            admin: true,
            can_create_runs: None,
        }
    }

    /// Whether the member holds the given role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// The team roster, loaded from `.fit/team.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub members: Vec<Member>,
}

impl TeamRoster {
    /// Load the roster, or None if the project has no roster file
    pub fn load(project: &Project) -> Option<Self> {
        let path = project.team_path();
        let content = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    /// Find a member by name, case-insensitively
    pub fn find(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}
