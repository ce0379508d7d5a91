use serde::{Deserialize, Serialize};

/// Organizational roles, closed set. A user may hold several assignments;
/// workflow decisions always use the single highest one by [`Role::level`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Outsider,
    Student,
    Staff,
    EventCoordinator,
    DepartmentHead,
    DeanStudentAffairs,
    Dean,
    SenateMember,
    SuperAdmin,
}

/// Every role, lowest privilege first.
pub const ALL_ROLES: [Role; 9] = [
    Role::Outsider,
    Role::Student,
    Role::Staff,
    Role::EventCoordinator,
    Role::DepartmentHead,
    Role::DeanStudentAffairs,
    Role::Dean,
    Role::SenateMember,
    Role::SuperAdmin,
];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Outsider => "OUTSIDER",
            Role::Student => "STUDENT",
            Role::Staff => "STAFF",
            Role::EventCoordinator => "EVENT_COORDINATOR",
            Role::DepartmentHead => "DEPARTMENT_HEAD",
            Role::DeanStudentAffairs => "DEAN_STUDENT_AFFAIRS",
            Role::Dean => "DEAN",
            Role::SenateMember => "SENATE_MEMBER",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "OUTSIDER" => Some(Role::Outsider),
            "STUDENT" => Some(Role::Student),
            "STAFF" => Some(Role::Staff),
            "EVENT_COORDINATOR" => Some(Role::EventCoordinator),
            "DEPARTMENT_HEAD" => Some(Role::DepartmentHead),
            "DEAN_STUDENT_AFFAIRS" => Some(Role::DeanStudentAffairs),
            "DEAN" => Some(Role::Dean),
            "SENATE_MEMBER" => Some(Role::SenateMember),
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// Privilege level. Higher wins when resolving a user's effective role.
    pub fn level(self) -> u8 {
        match self {
            Role::Outsider => 1,
            Role::Student => 2,
            Role::Staff => 3,
            Role::EventCoordinator => 4,
            Role::DepartmentHead => 5,
            Role::DeanStudentAffairs => 6,
            Role::Dean => 7,
            Role::SenateMember => 8,
            Role::SuperAdmin => 9,
        }
    }

    /// Collapses a role-assignment list to the single effective role.
    ///
    /// An empty list resolves to `Student`: every authenticated campus
    /// account is at least a student, and `Outsider` is only ever an
    /// explicit assignment.
    pub fn effective(roles: &[Role]) -> Role {
        roles
            .iter()
            .copied()
            .max_by_key(|role| role.level())
            .unwrap_or(Role::Student)
    }
}
