//! Capability-based learning platform.
//!
//! Students, teachers and administrators differ only in the capability
//! set their [`Role`] grants; [`Campus`] checks that set on every call.

pub mod campus;
pub mod capability;
pub mod error;
pub mod records;

pub use campus::{Analytics, Campus, CourseStats, Enrolled};
pub use capability::{Capability, Permissions, Role};
pub use error::CampusError;
pub use records::{Course, CourseTest, Enrollment, Material, Member, Review, ReviewStatus};
