use super::state::RecordState;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a tax lot or property view.
    RecordId
);
id_newtype!(CycleId);
id_newtype!(OrgId);

/// Reporting period the record's current state belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: CycleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Cycle {
    pub fn new(id: impl Into<CycleId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Role of the current user inside the record's organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Viewer,
    #[default]
    Member,
    Owner,
}

impl UserRole {
    pub fn can_edit(self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Viewer => "viewer",
            Self::Member => "member",
            Self::Owner => "owner",
        };
        write!(f, "{label}")
    }
}

/// One tax lot or property as delivered by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub cycle: Cycle,
    pub organization_id: OrgId,
    #[serde(default)]
    pub state: RecordState,
    #[serde(default)]
    pub user_role: UserRole,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        cycle: Cycle,
        organization_id: impl Into<OrgId>,
        state: RecordState,
    ) -> Self {
        Self {
            id: id.into(),
            cycle,
            organization_id: organization_id.into(),
            state,
            user_role: UserRole::default(),
        }
    }

    pub fn with_user_role(mut self, role: UserRole) -> Self {
        self.user_role = role;
        self
    }
}
