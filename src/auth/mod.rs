//! Session authentication and role-based authorization.

mod extractor;
mod gate;

pub use extractor::CurrentUser;
pub use gate::AccessGate;

/// Named permissions checked by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewReports,
    ManageReports,
    ViewRoleGroups,
    ManageRoleGroups,
    ViewUsers,
    ManageUsers,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewReports => "view_reports",
            Self::ManageReports => "manage_reports",
            Self::ViewRoleGroups => "view_role_groups",
            Self::ManageRoleGroups => "manage_role_groups",
            Self::ViewUsers => "view_users",
            Self::ManageUsers => "manage_users",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
