use std::sync::Arc;

use clap::Args;
use gradbridge::directory::{CourseId, InstituteId, StudentId};
use gradbridge::error::AppError;
use gradbridge::memory::{
    MemoryApplicationStore, MemoryDirectory, MemoryJobBoard, MemoryNotifications,
};
use gradbridge::notify::NotificationKind;
use gradbridge::workflows::admissions::{
    AdmissionService, ApplicationStatus, ApplicationSubmission, CourseApplication,
};
use gradbridge::workflows::recruitment::{JobPostingDraft, JobRequirements, RecruitmentService};

use crate::infra::seed_directory;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the recruitment portion of the demo.
    #[arg(long)]
    pub(crate) skip_recruitment: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Admissions and recruitment demo");

    let directory = Arc::new(MemoryDirectory::default());
    seed_directory(&directory);
    let applications = Arc::new(MemoryApplicationStore::default());
    let job_board = Arc::new(MemoryJobBoard::default());
    let notifications = Arc::new(MemoryNotifications::default());

    let admissions = Arc::new(AdmissionService::new(
        applications,
        directory.clone(),
        notifications.clone(),
    ));
    let recruitment = Arc::new(RecruitmentService::new(
        job_board,
        directory,
        notifications.clone(),
    ));

    let amara = StudentId("stu-amara".to_string());
    let bongani = StudentId("stu-bongani".to_string());
    let chen = StudentId("stu-chen".to_string());
    let cs101 = CourseId("crs-cs101".to_string());
    let civ110 = CourseId("crs-civ110".to_string());

    println!("\nCourse applications");
    let amara_highveld = match submit(&admissions, &amara, &cs101).await {
        Some(application) => application,
        None => return Ok(()),
    };
    let amara_coastal = match submit(&admissions, &amara, &civ110).await {
        Some(application) => application,
        None => return Ok(()),
    };
    let bongani_coastal = match submit(&admissions, &bongani, &civ110).await {
        Some(application) => application,
        None => return Ok(()),
    };

    match admissions.validate_application(&chen, &cs101).await {
        Ok(report) => println!(
            "- Pre-flight check for {} on {}: allowed={}{}",
            chen.0,
            cs101.0,
            report.allowed,
            report
                .reason
                .map(|reason| format!(" ({reason})"))
                .unwrap_or_default()
        ),
        Err(err) => println!("  Pre-flight check unavailable: {err}"),
    }

    println!("\nInstitution decisions");
    set_status(&admissions, &bongani_coastal, ApplicationStatus::Waiting).await;
    set_status(&admissions, &amara_highveld, ApplicationStatus::Admitted).await;
    set_status(&admissions, &amara_coastal, ApplicationStatus::Admitted).await;

    println!("\nInstitution selection");
    let outcome = match admissions
        .select_institution(
            &amara,
            &amara_highveld.id,
            &InstituteId("inst-highveld".to_string()),
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Selection rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- {} confirmed their seat on {} ({})",
        amara.0, outcome.confirmed.course_id.0, outcome.confirmed.institute_id.0
    );
    for released in &outcome.released {
        println!(
            "- Released offer {} at {}: {}",
            released.id.0,
            released.institute_id.0,
            released.decision_note.as_deref().unwrap_or("no note")
        );
    }
    for promoted in &outcome.promoted {
        println!(
            "- Promoted {} from the {} waitlist to admitted",
            promoted.student_id.0, promoted.institute_id.0
        );
    }

    if args.skip_recruitment {
        render_notification_summary(&notifications);
        return Ok(());
    }

    println!("\nJob posting and fan-out");
    let draft = JobPostingDraft {
        company_id: gradbridge::directory::CompanyId("co-acme".to_string()),
        title: "Graduate Data Analyst".to_string(),
        description: "Entry-level analytics role for recent graduates.".to_string(),
        requirements: JobRequirements {
            minimum_grade: Some(70.0),
            required_subjects: ["Mathematics".to_string()].into_iter().collect(),
            work_experience: true,
        },
    };
    let job = match recruitment.post_job(draft).await {
        Ok(job) => job,
        Err(err) => {
            println!("  Posting rejected: {err}");
            return Ok(());
        }
    };
    println!("- Posted {} ({})", job.title, job.id.0);

    match recruitment.plan_notifications_for_job(&job.id).await {
        Ok(plan) => {
            println!(
                "- Qualified wave: {}",
                plan.qualified
                    .iter()
                    .map(|id| id.0.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!(
                "- Generic wave: {}",
                plan.notified
                    .iter()
                    .map(|id| id.0.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Err(err) => println!("  Fan-out unavailable: {err}"),
    }

    println!("\nJob applications and review");
    let mut amara_job_application = None;
    for student in [&amara, &bongani] {
        match recruitment.apply_to_job(student, &job.id).await {
            Ok(application) => {
                println!(
                    "- {} applied ({}, status {})",
                    student.0,
                    application.id.0,
                    application.status.label()
                );
                if student == &amara {
                    amara_job_application = Some(application);
                }
            }
            Err(err) => println!("  Application from {} rejected: {err}", student.0),
        }
    }

    match recruitment.qualified_applicants(&job.id).await {
        Ok(ranked) => {
            println!("- Qualified applicants, best first:");
            for applicant in &ranked {
                println!("    {} scored {}", applicant.student_id.0, applicant.score);
                for reason in &applicant.matches {
                    println!("      * {reason}");
                }
            }
        }
        Err(err) => println!("  Ranking unavailable: {err}"),
    }

    if let Some(application) = amara_job_application {
        use gradbridge::workflows::recruitment::JobApplicationStatus;
        for to in [
            JobApplicationStatus::ReadyForInterview,
            JobApplicationStatus::Accepted,
        ] {
            match recruitment.set_job_application_status(&application.id, to).await {
                Ok(updated) => println!(
                    "- Company moved {} to {}",
                    updated.id.0,
                    updated.status.label()
                ),
                Err(err) => {
                    println!("  Status change for {} rejected: {err}", application.id.0)
                }
            }
        }
    }

    render_notification_summary(&notifications);
    Ok(())
}

async fn submit<S, D, N>(
    admissions: &AdmissionService<S, D, N>,
    student: &StudentId,
    course: &CourseId,
) -> Option<CourseApplication>
where
    S: gradbridge::workflows::admissions::ApplicationStore + 'static,
    D: gradbridge::directory::CampusDirectory + 'static,
    N: gradbridge::notify::NotificationSink + 'static,
{
    let submission = ApplicationSubmission {
        student_id: student.clone(),
        course_id: course.clone(),
        personal_statement: None,
        documents: Vec::new(),
    };
    match admissions.submit_application(submission).await {
        Ok(application) => {
            println!(
                "- {} applied to {} at {} ({}, status {})",
                student.0,
                application.course_id.0,
                application.institute_id.0,
                application.id.0,
                application.status.label()
            );
            Some(application)
        }
        Err(err) => {
            println!("  Submission from {} rejected: {err}", student.0);
            None
        }
    }
}

async fn set_status<S, D, N>(
    admissions: &AdmissionService<S, D, N>,
    application: &CourseApplication,
    to: ApplicationStatus,
) where
    S: gradbridge::workflows::admissions::ApplicationStore + 'static,
    D: gradbridge::directory::CampusDirectory + 'static,
    N: gradbridge::notify::NotificationSink + 'static,
{
    match admissions
        .set_application_status(&application.id, to, None)
        .await
    {
        Ok(updated) => println!(
            "- {} moved {} to {}",
            updated.institute_id.0,
            updated.id.0,
            updated.status.label()
        ),
        Err(err) => println!("  Status change for {} rejected: {err}", application.id.0),
    }
}

/// Fan-out wave deliveries race with the posting path, so only the
/// admission and acceptance notices are summarized here.
fn render_notification_summary(notifications: &MemoryNotifications) {
    println!("\nLifecycle notifications delivered");
    let delivered = notifications.delivered();
    let lifecycle: Vec<_> = delivered
        .iter()
        .filter(|notice| {
            matches!(
                notice.kind,
                NotificationKind::Admission | NotificationKind::Acceptance
            )
        })
        .collect();
    if lifecycle.is_empty() {
        println!("- none");
        return;
    }
    for notice in lifecycle {
        println!(
            "- [{}] to {}: {}",
            notice.kind.label(),
            notice.user_id.0,
            notice.message
        );
    }
}
