use serde::Serialize;

use super::domain::JobRequirements;
use crate::directory::QualificationProfile;

/// Score at or above which an applicant counts as qualified for a job.
pub const QUALIFIED_THRESHOLD: u8 = 50;

const GRADE_MET_POINTS: u8 = 30;
const GRADE_ON_FILE_POINTS: u8 = 20;
const FULL_SUBJECTS_POINTS: u8 = 30;
const PARTIAL_SUBJECTS_POINTS: u8 = 15;
const TRANSCRIPT_POINTS: u8 = 20;
const CERTIFICATE_POINTS: u8 = 10;
const CERTIFICATE_CAP: usize = 2;
const WORK_EXPERIENCE_POINTS: u8 = 20;
const MAX_SCORE: u8 = 100;

/// Weighted score for one student against one job's requirement bar, with a
/// reason string per satisfied category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationScore {
    pub score: u8,
    pub matches: Vec<String>,
}

impl QualificationScore {
    pub fn is_qualified(&self) -> bool {
        self.score >= QUALIFIED_THRESHOLD
    }
}

/// Additive, per-category capped scoring. The grade rows and the subject
/// rows are each mutually exclusive; the final score is clamped to 100.
pub fn score(profile: &QualificationProfile, requirements: &JobRequirements) -> QualificationScore {
    let mut total: u8 = 0;
    let mut matches = Vec::new();

    match (requirements.minimum_grade, profile.high_school_grade) {
        (Some(minimum), Some(grade)) if grade >= minimum => {
            total += GRADE_MET_POINTS;
            matches.push(format!("grade {grade} meets the required minimum {minimum}"));
        }
        (None, Some(grade)) => {
            total += GRADE_ON_FILE_POINTS;
            matches.push(format!("grade {grade} on file"));
        }
        _ => {}
    }

    if !requirements.required_subjects.is_empty() {
        let present = requirements
            .required_subjects
            .iter()
            .filter(|subject| profile.subjects.contains(*subject))
            .count();
        if present == requirements.required_subjects.len() {
            total += FULL_SUBJECTS_POINTS;
            matches.push(format!("all {present} required subjects present"));
        } else if present > 0 {
            total += PARTIAL_SUBJECTS_POINTS;
            matches.push(format!(
                "{present} of {} required subjects present",
                requirements.required_subjects.len()
            ));
        }
    }

    if profile.transcript_url.is_some() {
        total += TRANSCRIPT_POINTS;
        matches.push("transcript uploaded".to_string());
    }

    let certificates = profile.certificates.len().min(CERTIFICATE_CAP);
    if certificates > 0 {
        total += CERTIFICATE_POINTS * certificates as u8;
        matches.push(format!("{certificates} certificate(s) on file"));
    }

    if requirements.work_experience && !profile.work_experience.is_empty() {
        total += WORK_EXPERIENCE_POINTS;
        matches.push(format!(
            "{} work experience entry(s) listed",
            profile.work_experience.len()
        ));
    }

    QualificationScore {
        score: total.min(MAX_SCORE),
        matches,
    }
}

/// Qualification predicate for notification fan-out: the minimum-grade check
/// plus the full required-subject check only. Work experience and
/// certificates never gate fan-out.
pub fn meets_posting_requirements(
    profile: &QualificationProfile,
    requirements: &JobRequirements,
) -> bool {
    if let Some(minimum) = requirements.minimum_grade {
        match profile.high_school_grade {
            Some(grade) if grade >= minimum => {}
            _ => return false,
        }
    }

    requirements
        .required_subjects
        .iter()
        .all(|subject| profile.subjects.contains(subject))
}
