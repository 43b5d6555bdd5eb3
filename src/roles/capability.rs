//! Capabilities and the roles built from them.
//!
//! Roles do not inherit from one another. Each role is a named union of
//! capability sets, so a teacher can do everything a student can because
//! its set contains the student set, not because of a type hierarchy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single thing a member may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    BrowseCourses,
    Enroll,
    TakeTest,
    TrackProgress,
    WriteReview,
    CreateCourse,
    EditCourse,
    AddMaterial,
    CreateTest,
    ViewStatistics,
    ModerateReviews,
    ManageUsers,
    ManageCategories,
    ViewAnalytics,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions(BTreeSet<Capability>);

impl Permissions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self(capabilities.into_iter().collect())
    }

    /// Everything in either set.
    pub fn union(&self, other: &Permissions) -> Permissions {
        Permissions(self.0.union(&other.0).copied().collect())
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Whether every capability of `other` is also in this set.
    pub fn includes(&self, other: &Permissions) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Named bundles of capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Teacher,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Administrator];

    pub fn permissions(self) -> Permissions {
        let learner = Permissions::of([
            Capability::BrowseCourses,
            Capability::Enroll,
            Capability::TakeTest,
            Capability::TrackProgress,
            Capability::WriteReview,
        ]);
        let author = Permissions::of([
            Capability::CreateCourse,
            Capability::EditCourse,
            Capability::AddMaterial,
            Capability::CreateTest,
            Capability::ViewStatistics,
            Capability::ModerateReviews,
        ]);
        let operator = Permissions::of([
            Capability::ManageUsers,
            Capability::ManageCategories,
            Capability::ViewAnalytics,
        ]);

        match self {
            Role::Student => learner,
            Role::Teacher => learner.union(&author),
            Role::Administrator => learner.union(&author).union(&operator),
        }
    }

    pub fn allows(self, capability: Capability) -> bool {
        self.permissions().allows(capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_nest_by_set_inclusion() {
        let student = Role::Student.permissions();
        let teacher = Role::Teacher.permissions();
        let admin = Role::Administrator.permissions();

        assert!(teacher.includes(&student));
        assert!(admin.includes(&teacher));
        assert!(!student.includes(&teacher));
        assert_eq!(admin.len(), 14);
    }

    #[test]
    fn role_specific_capabilities() {
        assert!(Role::Student.allows(Capability::Enroll));
        assert!(!Role::Student.allows(Capability::CreateCourse));
        assert!(Role::Teacher.allows(Capability::ModerateReviews));
        assert!(!Role::Teacher.allows(Capability::ManageUsers));
        assert!(Role::Administrator.allows(Capability::ViewAnalytics));
    }

    #[test]
    fn union_is_commutative() {
        let a = Permissions::of([Capability::Enroll]);
        let b = Permissions::of([Capability::TakeTest, Capability::Enroll]);
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).len(), 2);
        assert!(Permissions::empty().is_empty());
    }
}
