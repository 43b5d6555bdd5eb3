//! The learning platform registry.
//!
//! Every operation names the acting member first. The registry looks the
//! member up, refuses blocked members and checks the capability the
//! operation needs before touching any record.

use super::capability::{Capability, Role};
use super::error::CampusError;
use super::records::{Course, CourseTest, Enrollment, Material, Member, Review, ReviewStatus};
use crate::clock::{Clock, SystemClock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether `enroll` changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrolled {
    Joined,
    AlreadyEnrolled,
}

/// Per-course numbers shown to the author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStats {
    pub course_id: String,
    pub enrolled: u32,
    pub average_progress: f64,
    pub average_score: Option<f64>,
    pub average_rating: Option<f64>,
    pub reviews: usize,
}

/// Platform-wide numbers for administrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub members_by_role: BTreeMap<Role, usize>,
    pub blocked_members: usize,
    pub courses: usize,
    pub categories: usize,
    pub reviews: usize,
    pub pending_reviews: usize,
    /// Course ids ordered by enrolment, most popular first
    pub popular_courses: Vec<(String, u32)>,
}

pub struct Campus {
    members: BTreeMap<String, Member>,
    courses: BTreeMap<String, Course>,
    reviews: BTreeMap<String, Review>,
    categories: BTreeMap<String, String>,
    clock: Arc<dyn Clock>,
}

impl Default for Campus {
    fn default() -> Self {
        Self::new()
    }
}

impl Campus {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            members: BTreeMap::new(),
            courses: BTreeMap::new(),
            reviews: BTreeMap::new(),
            categories: BTreeMap::new(),
            clock,
        }
    }

    /// Self-service sign-up; returns the new member id.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<String, CampusError> {
        let name = non_blank(name, "name")?;
        if !email.contains('@') {
            return Err(CampusError::InvalidEmail(email.to_string()));
        }
        let member = Member::new(name, email.trim().to_string(), role, self.clock.now());
        let id = member.id.clone();
        tracing::info!(member = %id, %role, "member registered");
        self.members.insert(id.clone(), member);
        Ok(id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn review(&self, id: &str) -> Option<&Review> {
        self.reviews.get(id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Look up `actor` and make sure it may use `capability`.
    pub fn authorize(&self, actor: &str, capability: Capability) -> Result<&Member, CampusError> {
        let member = self
            .members
            .get(actor)
            .ok_or_else(|| CampusError::UnknownMember(actor.to_string()))?;
        if member.blocked {
            return Err(CampusError::Blocked(actor.to_string()));
        }
        if !member.role.allows(capability) {
            tracing::warn!(member = %actor, role = %member.role, %capability, "permission denied");
            return Err(CampusError::PermissionDenied {
                member: actor.to_string(),
                role: member.role,
                capability,
            });
        }
        Ok(member)
    }

    // ---- student --------------------------------------------------------

    pub fn browse(&self, actor: &str) -> Result<Vec<&Course>, CampusError> {
        self.authorize(actor, Capability::BrowseCourses)?;
        Ok(self.courses.values().collect())
    }

    pub fn enroll(&mut self, actor: &str, course_id: &str) -> Result<Enrolled, CampusError> {
        self.authorize(actor, Capability::Enroll)?;
        let course = self
            .courses
            .get_mut(course_id)
            .ok_or_else(|| CampusError::UnknownCourse(course_id.to_string()))?;
        let member = self.members.get_mut(actor).ok_or_else(|| CampusError::UnknownMember(actor.to_string()))?;

        if member.is_enrolled(course_id) {
            return Ok(Enrolled::AlreadyEnrolled);
        }
        member.enrollments.insert(course_id.to_string(), Enrollment::default());
        course.enrolled += 1;
        tracing::info!(member = %actor, course = %course_id, "enrolled");
        Ok(Enrolled::Joined)
    }

    /// Record a test result; the latest score replaces the previous one.
    pub fn take_test(&mut self, actor: &str, course_id: &str, score: u32) -> Result<(), CampusError> {
        self.authorize(actor, Capability::TakeTest)?;
        self.enrollment_mut(actor, course_id)?.test_score = Some(score);
        Ok(())
    }

    /// Set progress in percent, clamped to 100. Returns the stored value.
    pub fn update_progress(
        &mut self,
        actor: &str,
        course_id: &str,
        progress: u32,
    ) -> Result<u8, CampusError> {
        self.authorize(actor, Capability::TrackProgress)?;
        let enrollment = self.enrollment_mut(actor, course_id)?;
        enrollment.progress = progress.min(100) as u8;
        Ok(enrollment.progress)
    }

    /// Leave a review on an enrolled course. Reviews start out pending.
    pub fn write_review(
        &mut self,
        actor: &str,
        course_id: &str,
        rating: i32,
        comment: &str,
    ) -> Result<String, CampusError> {
        let member = self.authorize(actor, Capability::WriteReview)?;
        if !self.courses.contains_key(course_id) {
            return Err(CampusError::UnknownCourse(course_id.to_string()));
        }
        if !member.is_enrolled(course_id) {
            return Err(not_enrolled(actor, course_id));
        }

        let review = Review::new(member, course_id, rating, comment.trim(), self.clock.now());
        let id = review.id.clone();
        if let Some(course) = self.courses.get_mut(course_id) {
            course.reviews.push(id.clone());
        }
        self.reviews.insert(id.clone(), review);
        Ok(id)
    }

    /// Per-course standing of `actor`, by course id.
    pub fn progress_report(&self, actor: &str) -> Result<Vec<(String, Enrollment)>, CampusError> {
        let member = self.authorize(actor, Capability::TrackProgress)?;
        Ok(member
            .enrollments
            .iter()
            .map(|(id, e)| (id.clone(), e.clone()))
            .collect())
    }

    // ---- teacher --------------------------------------------------------

    pub fn create_course(
        &mut self,
        actor: &str,
        title: &str,
        description: &str,
        category: &str,
    ) -> Result<String, CampusError> {
        self.authorize(actor, Capability::CreateCourse)?;
        let title = non_blank(title, "course title")?;
        if !self.categories.contains_key(category) {
            return Err(CampusError::UnknownCategory(category.to_string()));
        }

        let course = Course {
            id: super::records::short_id(),
            title,
            description: description.trim().to_string(),
            category: category.to_string(),
            author_id: actor.to_string(),
            materials: Vec::new(),
            tests: Vec::new(),
            reviews: Vec::new(),
            enrolled: 0,
            created_at: self.clock.now(),
        };
        let id = course.id.clone();
        if let Some(member) = self.members.get_mut(actor) {
            member.authored.insert(id.clone());
        }
        tracing::info!(author = %actor, course = %id, "course created");
        self.courses.insert(id.clone(), course);
        Ok(id)
    }

    pub fn edit_course(
        &mut self,
        actor: &str,
        course_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), CampusError> {
        let title = non_blank(title, "course title")?;
        let course = self.authored_course_mut(actor, Capability::EditCourse, course_id)?;
        course.title = title;
        course.description = description.trim().to_string();
        Ok(())
    }

    pub fn add_material(
        &mut self,
        actor: &str,
        course_id: &str,
        name: &str,
        kind: &str,
    ) -> Result<(), CampusError> {
        let name = non_blank(name, "material name")?;
        let course = self.authored_course_mut(actor, Capability::AddMaterial, course_id)?;
        course.materials.push(Material {
            name,
            kind: kind.trim().to_string(),
        });
        Ok(())
    }

    pub fn create_test(
        &mut self,
        actor: &str,
        course_id: &str,
        name: &str,
        max_score: u32,
    ) -> Result<(), CampusError> {
        let name = non_blank(name, "test name")?;
        let course = self.authored_course_mut(actor, Capability::CreateTest, course_id)?;
        course.tests.push(CourseTest { name, max_score });
        Ok(())
    }

    /// Statistics for a course the actor wrote.
    pub fn course_statistics(&self, actor: &str, course_id: &str) -> Result<CourseStats, CampusError> {
        let member = self.authorize(actor, Capability::ViewStatistics)?;
        let course = self
            .courses
            .get(course_id)
            .ok_or_else(|| CampusError::UnknownCourse(course_id.to_string()))?;
        if !member.is_author_of(course_id) {
            return Err(CampusError::NotAuthor {
                member: actor.to_string(),
                course: course_id.to_string(),
            });
        }

        let enrollments: Vec<&Enrollment> = self
            .members
            .values()
            .filter_map(|m| m.enrollments.get(course_id))
            .collect();
        let progress: Vec<f64> = enrollments.iter().map(|e| f64::from(e.progress)).collect();
        let scores: Vec<f64> = enrollments
            .iter()
            .filter_map(|e| e.test_score.map(f64::from))
            .collect();
        let ratings: Vec<f64> = course
            .reviews
            .iter()
            .filter_map(|id| self.reviews.get(id))
            .filter(|r| r.status != ReviewStatus::Rejected)
            .map(|r| f64::from(r.rating()))
            .collect();

        Ok(CourseStats {
            course_id: course_id.to_string(),
            enrolled: course.enrolled,
            average_progress: mean(&progress).unwrap_or(0.0),
            average_score: mean(&scores),
            average_rating: mean(&ratings),
            reviews: course.reviews.len(),
        })
    }

    pub fn moderate_review(
        &mut self,
        actor: &str,
        review_id: &str,
        approve: bool,
    ) -> Result<ReviewStatus, CampusError> {
        self.authorize(actor, Capability::ModerateReviews)?;
        let review = self
            .reviews
            .get_mut(review_id)
            .ok_or_else(|| CampusError::UnknownReview(review_id.to_string()))?;
        review.status = if approve {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Rejected
        };
        tracing::info!(moderator = %actor, review = %review_id, status = ?review.status, "review moderated");
        Ok(review.status)
    }

    // ---- administrator --------------------------------------------------

    pub fn create_user(
        &mut self,
        actor: &str,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<String, CampusError> {
        self.authorize(actor, Capability::ManageUsers)?;
        self.register(name, email, role)
    }

    pub fn block_user(&mut self, actor: &str, target: &str) -> Result<(), CampusError> {
        self.set_blocked(actor, target, true, "block")
    }

    pub fn unblock_user(&mut self, actor: &str, target: &str) -> Result<(), CampusError> {
        self.set_blocked(actor, target, false, "unblock")
    }

    /// Remove a member along with their enrolments. Courses they wrote stay.
    pub fn delete_user(&mut self, actor: &str, target: &str) -> Result<Member, CampusError> {
        self.authorize(actor, Capability::ManageUsers)?;
        if actor == target {
            return Err(CampusError::SelfAction("delete"));
        }
        let member = self
            .members
            .remove(target)
            .ok_or_else(|| CampusError::UnknownMember(target.to_string()))?;
        for course_id in member.enrollments.keys() {
            if let Some(course) = self.courses.get_mut(course_id) {
                course.enrolled = course.enrolled.saturating_sub(1);
            }
        }
        tracing::info!(admin = %actor, member = %target, "member deleted");
        Ok(member)
    }

    pub fn create_category(
        &mut self,
        actor: &str,
        name: &str,
        description: &str,
    ) -> Result<(), CampusError> {
        self.authorize(actor, Capability::ManageCategories)?;
        let name = non_blank(name, "category name")?;
        if self.categories.contains_key(&name) {
            return Err(CampusError::DuplicateCategory(name));
        }
        self.categories.insert(name, description.trim().to_string());
        Ok(())
    }

    pub fn analytics(&self, actor: &str) -> Result<Analytics, CampusError> {
        self.authorize(actor, Capability::ViewAnalytics)?;

        let mut members_by_role = BTreeMap::new();
        for member in self.members.values() {
            *members_by_role.entry(member.role).or_insert(0) += 1;
        }
        let mut popular_courses: Vec<(String, u32)> = self
            .courses
            .values()
            .map(|c| (c.id.clone(), c.enrolled))
            .collect();
        popular_courses.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Analytics {
            members_by_role,
            blocked_members: self.members.values().filter(|m| m.blocked).count(),
            courses: self.courses.len(),
            categories: self.categories.len(),
            reviews: self.reviews.len(),
            pending_reviews: self
                .reviews
                .values()
                .filter(|r| r.status == ReviewStatus::Pending)
                .count(),
            popular_courses,
        })
    }

    fn set_blocked(
        &mut self,
        actor: &str,
        target: &str,
        blocked: bool,
        verb: &'static str,
    ) -> Result<(), CampusError> {
        self.authorize(actor, Capability::ManageUsers)?;
        if actor == target {
            return Err(CampusError::SelfAction(verb));
        }
        let member = self
            .members
            .get_mut(target)
            .ok_or_else(|| CampusError::UnknownMember(target.to_string()))?;
        member.blocked = blocked;
        tracing::info!(admin = %actor, member = %target, blocked, "member access changed");
        Ok(())
    }

    fn enrollment_mut(&mut self, actor: &str, course_id: &str) -> Result<&mut Enrollment, CampusError> {
        if !self.courses.contains_key(course_id) {
            return Err(CampusError::UnknownCourse(course_id.to_string()));
        }
        self.members
            .get_mut(actor)
            .and_then(|m| m.enrollments.get_mut(course_id))
            .ok_or_else(|| not_enrolled(actor, course_id))
    }

    fn authored_course_mut(
        &mut self,
        actor: &str,
        capability: Capability,
        course_id: &str,
    ) -> Result<&mut Course, CampusError> {
        let is_author = self.authorize(actor, capability)?.is_author_of(course_id);
        let course = self
            .courses
            .get_mut(course_id)
            .ok_or_else(|| CampusError::UnknownCourse(course_id.to_string()))?;
        if !is_author {
            return Err(CampusError::NotAuthor {
                member: actor.to_string(),
                course: course_id.to_string(),
            });
        }
        Ok(course)
    }
}

fn non_blank(value: &str, what: &'static str) -> Result<String, CampusError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CampusError::Blank(what))
    } else {
        Ok(trimmed.to_string())
    }
}

fn not_enrolled(member: &str, course: &str) -> CampusError {
    CampusError::NotEnrolled {
        member: member.to_string(),
        course: course.to_string(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        campus: Campus,
        admin: String,
        teacher: String,
        student: String,
        course: String,
    }

    fn fixture() -> Fixture {
        let mut campus = Campus::new();
        let admin = campus.register("Root", "root@campus.io", Role::Administrator).unwrap();
        let teacher = campus.register("Tess", "tess@campus.io", Role::Teacher).unwrap();
        let student = campus.register("Sam", "sam@campus.io", Role::Student).unwrap();
        campus.create_category(&admin, "Programming", "Code").unwrap();
        let course = campus
            .create_course(&teacher, "Rust 101", "Ownership", "Programming")
            .unwrap();
        Fixture {
            campus,
            admin,
            teacher,
            student,
            course,
        }
    }

    #[test]
    fn students_cannot_author_courses() {
        let mut f = fixture();
        let err = f
            .campus
            .create_course(&f.student, "Mine", "", "Programming")
            .unwrap_err();
        assert!(matches!(
            err,
            CampusError::PermissionDenied {
                capability: Capability::CreateCourse,
                role: Role::Student,
                ..
            }
        ));
    }

    #[test]
    fn enrolling_twice_is_reported_not_counted() {
        let mut f = fixture();
        assert_eq!(f.campus.enroll(&f.student, &f.course), Ok(Enrolled::Joined));
        assert_eq!(f.campus.enroll(&f.student, &f.course), Ok(Enrolled::AlreadyEnrolled));
        assert_eq!(f.campus.course(&f.course).unwrap().enrolled, 1);
    }

    #[test]
    fn progress_is_clamped_and_needs_enrolment() {
        let mut f = fixture();
        assert!(matches!(
            f.campus.update_progress(&f.student, &f.course, 40),
            Err(CampusError::NotEnrolled { .. })
        ));
        f.campus.enroll(&f.student, &f.course).unwrap();
        assert_eq!(f.campus.update_progress(&f.student, &f.course, 250), Ok(100));
        assert_eq!(f.campus.update_progress(&f.student, &f.course, 35), Ok(35));
    }

    #[test]
    fn only_the_author_edits() {
        let mut f = fixture();
        let other = f.campus.register("Olga", "olga@campus.io", Role::Teacher).unwrap();

        assert!(matches!(
            f.campus.edit_course(&other, &f.course, "Hijacked", ""),
            Err(CampusError::NotAuthor { .. })
        ));
        f.campus
            .edit_course(&f.teacher, &f.course, "Rust 102", "Lifetimes")
            .unwrap();
        f.campus.add_material(&f.teacher, &f.course, "Slides", "pdf").unwrap();
        f.campus.create_test(&f.teacher, &f.course, "Quiz", 10).unwrap();

        let course = f.campus.course(&f.course).unwrap();
        assert_eq!(course.title, "Rust 102");
        assert_eq!(course.materials.len(), 1);
        assert_eq!(course.tests[0].max_score, 10);
    }

    #[test]
    fn statistics_are_computed_from_records() {
        let mut f = fixture();
        let second = f.campus.register("Sue", "sue@campus.io", Role::Student).unwrap();
        for id in [&f.student, &second] {
            f.campus.enroll(id, &f.course).unwrap();
        }
        f.campus.update_progress(&f.student, &f.course, 80).unwrap();
        f.campus.update_progress(&second, &f.course, 40).unwrap();
        f.campus.take_test(&f.student, &f.course, 9).unwrap();
        f.campus.write_review(&f.student, &f.course, 4, "good").unwrap();
        f.campus.write_review(&second, &f.course, 2, "meh").unwrap();

        let stats = f.campus.course_statistics(&f.teacher, &f.course).unwrap();
        assert_eq!(stats.enrolled, 2);
        assert_eq!(stats.average_progress, 60.0);
        assert_eq!(stats.average_score, Some(9.0));
        assert_eq!(stats.average_rating, Some(3.0));
    }

    #[test]
    fn moderation_changes_review_status() {
        let mut f = fixture();
        f.campus.enroll(&f.student, &f.course).unwrap();
        let review = f.campus.write_review(&f.student, &f.course, 7, "wow").unwrap();
        assert_eq!(f.campus.review(&review).unwrap().rating(), 5);

        assert!(f.campus.moderate_review(&f.student, &review, true).is_err());
        assert_eq!(
            f.campus.moderate_review(&f.teacher, &review, false),
            Ok(ReviewStatus::Rejected)
        );
    }

    #[test]
    fn blocked_members_are_denied_everything() {
        let mut f = fixture();
        f.campus.block_user(&f.admin, &f.student).unwrap();
        assert_eq!(
            f.campus.enroll(&f.student, &f.course),
            Err(CampusError::Blocked(f.student.clone()))
        );

        f.campus.unblock_user(&f.admin, &f.student).unwrap();
        assert!(f.campus.enroll(&f.student, &f.course).is_ok());
    }

    #[test]
    fn admins_cannot_target_themselves() {
        let mut f = fixture();
        assert_eq!(
            f.campus.block_user(&f.admin, &f.admin),
            Err(CampusError::SelfAction("block"))
        );
        assert!(f.campus.delete_user(&f.teacher, &f.student).is_err());
    }

    #[test]
    fn deleting_a_member_releases_enrolments() {
        let mut f = fixture();
        f.campus.enroll(&f.student, &f.course).unwrap();
        f.campus.delete_user(&f.admin, &f.student).unwrap();

        assert!(f.campus.member(&f.student).is_none());
        assert_eq!(f.campus.course(&f.course).unwrap().enrolled, 0);
    }

    #[test]
    fn categories_must_exist_and_be_unique() {
        let mut f = fixture();
        assert_eq!(
            f.campus.create_category(&f.admin, "Programming", ""),
            Err(CampusError::DuplicateCategory("Programming".into()))
        );
        assert!(matches!(
            f.campus.create_course(&f.teacher, "Art", "", "Painting"),
            Err(CampusError::UnknownCategory(_))
        ));
    }

    #[test]
    fn analytics_ranks_courses_by_enrolment() {
        let mut f = fixture();
        let quiet = f
            .campus
            .create_course(&f.teacher, "Quiet", "", "Programming")
            .unwrap();
        f.campus.enroll(&f.student, &f.course).unwrap();
        let staff = f
            .campus
            .create_user(&f.admin, "Ted", "ted@campus.io", Role::Teacher)
            .unwrap();

        let analytics = f.campus.analytics(&f.admin).unwrap();
        assert_eq!(analytics.members_by_role[&Role::Teacher], 2);
        assert_eq!(analytics.popular_courses[0], (f.course.clone(), 1));
        assert_eq!(analytics.popular_courses[1], (quiet, 0));
        assert!(f.campus.member(&staff).is_some());
        assert!(f.campus.analytics(&f.teacher).is_err());
    }
}
