use chrono::{DateTime, Utc};

use super::domain::{ApplicationId, ApplicationStatus, CourseApplication};
use super::repository::{ApplicationWrite, WriteBatch, WriteGuard};

/// Reason recorded on admissions released because the student confirmed a
/// seat somewhere else.
pub const RELEASED_NOTE: &str = "student selected another institution";

/// The transitions one `selectInstitution` call will apply as a unit.
#[derive(Debug, Clone)]
pub(crate) struct PlacementPlan {
    pub batch: WriteBatch,
    pub released: Vec<ApplicationId>,
    pub promoted: Vec<ApplicationId>,
}

/// Builds the confirm + release + promote batch for a student's institution
/// choice.
///
/// `admitted` is every admitted application the student holds. `promotions`
/// are the already-screened waitlist candidates, at most one per released
/// institution. The selected application is never released, and neither is
/// any other admitted application at the selected institution.
pub(crate) fn plan_selection(
    selected: &CourseApplication,
    admitted: &[CourseApplication],
    promotions: &[CourseApplication],
    now: DateTime<Utc>,
) -> PlacementPlan {
    let mut batch = WriteBatch::default();

    batch.guards.push(WriteGuard::StatusIs {
        id: selected.id.clone(),
        expected: ApplicationStatus::Admitted,
    });
    batch.writes.push(ApplicationWrite::SetStatus {
        id: selected.id.clone(),
        to: ApplicationStatus::Confirmed,
        note: None,
        updated_at: now,
    });

    let mut released = Vec::new();
    for application in admitted {
        if application.id == selected.id || application.institute_id == selected.institute_id {
            continue;
        }
        batch.guards.push(WriteGuard::StatusIs {
            id: application.id.clone(),
            expected: ApplicationStatus::Admitted,
        });
        batch.writes.push(ApplicationWrite::SetStatus {
            id: application.id.clone(),
            to: ApplicationStatus::Rejected,
            note: Some(RELEASED_NOTE.to_string()),
            updated_at: now,
        });
        released.push(application.id.clone());
    }

    let mut promoted = Vec::new();
    for candidate in promotions {
        batch.guards.push(WriteGuard::StatusIs {
            id: candidate.id.clone(),
            expected: ApplicationStatus::Waiting,
        });
        batch.guards.push(WriteGuard::NoCompetingAdmission {
            student: candidate.student_id.clone(),
            institute: candidate.institute_id.clone(),
            except: candidate.id.clone(),
        });
        batch.writes.push(ApplicationWrite::SetStatus {
            id: candidate.id.clone(),
            to: ApplicationStatus::Admitted,
            note: None,
            updated_at: now,
        });
        promoted.push(candidate.id.clone());
    }

    PlacementPlan {
        batch,
        released,
        promoted,
    }
}
