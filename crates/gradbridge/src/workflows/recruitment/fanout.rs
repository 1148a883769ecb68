use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{JobId, JobPosting};
use super::scoring::meets_posting_requirements;
use crate::directory::{Student, StudentId};
use crate::notify::{Notification, NotificationKind};

/// Which students receive which wave for a newly posted job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPlan {
    pub job_id: JobId,
    pub qualified: Vec<StudentId>,
    pub notified: Vec<StudentId>,
}

/// Partitions the roster for a new posting. Students with an uploaded
/// transcript who pass the posting predicate form the qualified wave;
/// everyone else lands in the generic wave. No student appears in both.
pub fn plan(job: &JobPosting, roster: &[Student]) -> NotificationPlan {
    let mut qualified = Vec::new();
    let mut notified = Vec::new();

    for student in roster {
        if student.profile.transcript_url.is_some()
            && meets_posting_requirements(&student.profile, &job.requirements)
        {
            qualified.push(student.id.clone());
        } else {
            notified.push(student.id.clone());
        }
    }

    NotificationPlan {
        job_id: job.id.clone(),
        qualified,
        notified,
    }
}

/// Notification for the qualified wave, naming the matched posting.
pub fn opportunity_notification(
    job: &JobPosting,
    student_id: &StudentId,
    now: DateTime<Utc>,
) -> Notification {
    Notification::new(
        student_id.clone(),
        NotificationKind::JobOpportunity,
        "You match a new job posting",
        format!(
            "Your qualifications match {}. Apply from your dashboard.",
            job.title
        ),
        now,
    )
}

/// Generic announcement for everyone outside the qualified wave.
pub fn vacancy_notification(
    job: &JobPosting,
    student_id: &StudentId,
    now: DateTime<Utc>,
) -> Notification {
    Notification::new(
        student_id.clone(),
        NotificationKind::JobVacancy,
        "New job vacancy posted",
        format!("{} is now open for applications.", job.title),
        now,
    )
}
