use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use gradbridge::directory::{
    Course, CourseId, DocumentRef, FacultyId, InstituteId, QualificationProfile, Student,
    StudentId, WorkExperience,
};
use gradbridge::memory::MemoryDirectory;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn subjects(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Seeds the directory with the students and courses the demo and dev server
/// work against. Applications and postings are created through the services.
pub(crate) fn seed_directory(directory: &MemoryDirectory) {
    directory.insert_student(Student {
        id: StudentId("stu-amara".to_string()),
        full_name: "Amara Okafor".to_string(),
        profile: QualificationProfile {
            high_school_grade: Some(85.0),
            subjects: subjects(&["English", "Mathematics", "Science"]),
            work_experience: vec![WorkExperience {
                employer: "Northgate Tutoring".to_string(),
                role: "Peer tutor".to_string(),
            }],
            transcript_url: Some("uploads/stu-amara/transcript.pdf".to_string()),
            certificates: vec![DocumentRef {
                name: "First aid level 1".to_string(),
                storage_key: "uploads/stu-amara/first-aid.pdf".to_string(),
            }],
        },
    });
    directory.insert_student(Student {
        id: StudentId("stu-bongani".to_string()),
        full_name: "Bongani Dlamini".to_string(),
        profile: QualificationProfile {
            high_school_grade: Some(72.0),
            subjects: subjects(&["English", "Mathematics"]),
            work_experience: Vec::new(),
            transcript_url: Some("uploads/stu-bongani/transcript.pdf".to_string()),
            certificates: Vec::new(),
        },
    });
    directory.insert_student(Student {
        id: StudentId("stu-chen".to_string()),
        full_name: "Chen Wei".to_string(),
        profile: QualificationProfile {
            high_school_grade: None,
            subjects: subjects(&["English"]),
            work_experience: Vec::new(),
            transcript_url: None,
            certificates: Vec::new(),
        },
    });

    directory.insert_course(Course {
        id: CourseId("crs-cs101".to_string()),
        institute_id: InstituteId("inst-highveld".to_string()),
        faculty_id: FacultyId("fac-engineering".to_string()),
        title: "Computer Science".to_string(),
        minimum_grade: Some(75.0),
        required_subjects: subjects(&["Mathematics", "Science"]),
    });
    directory.insert_course(Course {
        id: CourseId("crs-bus201".to_string()),
        institute_id: InstituteId("inst-highveld".to_string()),
        faculty_id: FacultyId("fac-commerce".to_string()),
        title: "Business Management".to_string(),
        minimum_grade: None,
        required_subjects: BTreeSet::new(),
    });
    directory.insert_course(Course {
        id: CourseId("crs-civ110".to_string()),
        institute_id: InstituteId("inst-coastal".to_string()),
        faculty_id: FacultyId("fac-engineering".to_string()),
        title: "Civil Engineering".to_string(),
        minimum_grade: Some(70.0),
        required_subjects: subjects(&["Mathematics"]),
    });
}
