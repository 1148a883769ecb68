use serde::Serialize;

use super::domain::{ApplicationStatus, CourseApplication};
use crate::directory::{Course, QualificationProfile};

/// Cap on course applications a student may hold at one institution.
pub const INSTITUTE_APPLICATION_LIMIT: usize = 2;

/// Reasons a course application is refused before it is ever written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EligibilityError {
    #[error("max {limit} courses per institution")]
    InstitutionLimitReached { limit: usize },
    #[error("already admitted to a program at this institution")]
    AlreadyAdmitted,
    #[error("grade {grade} is below the course minimum {minimum}")]
    GradeBelowMinimum { grade: f32, minimum: f32 },
    #[error("missing required subjects: {}", missing.join(", "))]
    MissingSubjects { missing: Vec<String> },
    #[error("already applied for this course")]
    DuplicateCourse,
}

/// Decides whether a student may apply to `course` given every application
/// they currently hold. Checks run in a fixed order and the first failure
/// wins. Pure; callers re-run the same checks at write time to close races.
pub fn evaluate(
    profile: &QualificationProfile,
    course: &Course,
    existing: &[CourseApplication],
) -> Result<(), EligibilityError> {
    let at_institute: Vec<&CourseApplication> = existing
        .iter()
        .filter(|application| application.institute_id == course.institute_id)
        .collect();

    if at_institute.len() >= INSTITUTE_APPLICATION_LIMIT {
        return Err(EligibilityError::InstitutionLimitReached {
            limit: INSTITUTE_APPLICATION_LIMIT,
        });
    }

    if at_institute
        .iter()
        .any(|application| application.status == ApplicationStatus::Admitted)
    {
        return Err(EligibilityError::AlreadyAdmitted);
    }

    if let (Some(minimum), Some(grade)) = (course.minimum_grade, profile.high_school_grade) {
        if grade < minimum {
            return Err(EligibilityError::GradeBelowMinimum { grade, minimum });
        }
    }

    if !course.required_subjects.is_empty() {
        let missing: Vec<String> = course
            .required_subjects
            .iter()
            .filter(|subject| !profile.subjects.contains(*subject))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(EligibilityError::MissingSubjects { missing });
        }
    }

    if existing
        .iter()
        .any(|application| application.course_id == course.id)
    {
        return Err(EligibilityError::DuplicateCourse);
    }

    Ok(())
}

/// Wire view of an eligibility decision for the pre-flight check endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EligibilityReport {
    pub fn from_check(outcome: &Result<(), EligibilityError>) -> Self {
        match outcome {
            Ok(()) => Self {
                allowed: true,
                reason: None,
            },
            Err(err) => Self {
                allowed: false,
                reason: Some(err.to_string()),
            },
        }
    }
}
