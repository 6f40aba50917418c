//! Users, roles, and departments.
//!
//! Role and department are closed vocabularies with one canonical label
//! lookup each. Display strings come from here and nowhere else.

use serde::{Deserialize, Serialize};

// ── User Identifier ──────────────────────────────────────────────────

/// Unique identifier for a user
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Role ─────────────────────────────────────────────────────────────

/// Organizational role of a user, snapshotted onto reports at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Regular staff member, reports route through manager review
    #[default]
    GeneralStaff,
    /// Department line manager, reviews staff reports for their department
    LineManager,
    /// General manager, performs executive review across departments
    Gm,
}

impl Role {
    /// Roles at or above manager level skip the manager review stage
    /// for reports they create themselves.
    pub fn is_manager_level(&self) -> bool {
        matches!(self, Self::LineManager | Self::Gm)
    }

    /// Canonical display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::GeneralStaff => "General Staff",
            Self::LineManager => "Line Manager",
            Self::Gm => "General Manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Department ───────────────────────────────────────────────────────

/// Business department a user and their reports belong to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    Accounting,
    Engineering,
    HumanResources,
    Operations,
    Sales,
}

impl Department {
    /// Canonical display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accounting => "Accounting",
            Self::Engineering => "Engineering",
            Self::HumanResources => "Human Resources",
            Self::Operations => "Operations",
            Self::Sales => "Sales",
        }
    }

    /// Stable key for group addressing and config files
    pub fn key(&self) -> &'static str {
        match self {
            Self::Accounting => "accounting",
            Self::Engineering => "engineering",
            Self::HumanResources => "human-resources",
            Self::Operations => "operations",
            Self::Sales => "sales",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── User ─────────────────────────────────────────────────────────────

/// A user known to the directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,
    /// Display name
    pub display_name: String,
    /// Organizational role
    pub role: Role,
    /// Department membership
    pub department: Department,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        department: Department,
    ) -> Self {
        Self {
            id: UserId::new(id),
            display_name: display_name.into(),
            role,
            department,
        }
    }
}
