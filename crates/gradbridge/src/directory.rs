//! Shared identity and profile records for the campus directory.
//!
//! Students, institutions, and companies are provisioned elsewhere on the
//! platform; the workflows only read them. The [`CampusDirectory`] trait is
//! the seam between lifecycle logic and whatever backs those records.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for student accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Identifier wrapper for institution tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstituteId(pub String);

/// Identifier wrapper for faculties within an institution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacultyId(pub String);

/// Identifier wrapper for courses offered by a faculty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(pub String);

/// Identifier wrapper for company tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// A prior employment entry on a student profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub employer: String,
    pub role: String,
}

/// Reference to an uploaded document kept in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub storage_key: String,
}

/// Academic profile used by eligibility screening and qualification scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationProfile {
    #[serde(default, deserialize_with = "deserialize_grade")]
    pub high_school_grade: Option<f32>,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub transcript_url: Option<String>,
    #[serde(default)]
    pub certificates: Vec<DocumentRef>,
}

/// Directory record for a student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub profile: QualificationProfile,
}

/// Directory record for a course, including its admission bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub institute_id: InstituteId,
    pub faculty_id: FacultyId,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_grade")]
    pub minimum_grade: Option<f32>,
    #[serde(default)]
    pub required_subjects: BTreeSet<String>,
}

/// Read access to directory records the workflows depend on.
#[async_trait::async_trait]
pub trait CampusDirectory: Send + Sync {
    async fn fetch_student(&self, id: &StudentId) -> Result<Option<Student>, DirectoryError>;
    async fn fetch_course(&self, id: &CourseId) -> Result<Option<Course>, DirectoryError>;
    /// Full student roster, used when planning notification fan-out.
    async fn students(&self) -> Result<Vec<Student>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Grades arrive as numbers or free-text strings depending on the upstream
/// form. Anything that does not parse as a number is treated as unset rather
/// than failing the whole record.
pub(crate) fn deserialize_grade<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GradeValue {
        Number(f32),
        Text(String),
    }

    let raw = Option::<GradeValue>::deserialize(deserializer)?;
    Ok(match raw {
        Some(GradeValue::Number(value)) => Some(value),
        Some(GradeValue::Text(value)) => value.trim().parse::<f32>().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_accepts_numbers_and_numeric_strings() {
        let json = r#"{"high_school_grade": 82.5}"#;
        let profile: QualificationProfile =
            serde_json::from_str(json).expect("numeric grade parses");
        assert_eq!(profile.high_school_grade, Some(82.5));

        let json = r#"{"high_school_grade": " 74 "}"#;
        let profile: QualificationProfile = serde_json::from_str(json).expect("string grade parses");
        assert_eq!(profile.high_school_grade, Some(74.0));
    }

    #[test]
    fn unparseable_grade_becomes_unset() {
        let json = r#"{"high_school_grade": "pass with merit"}"#;
        let profile: QualificationProfile =
            serde_json::from_str(json).expect("profile still deserializes");
        assert_eq!(profile.high_school_grade, None);
    }

    #[test]
    fn profile_defaults_to_empty_collections() {
        let profile: QualificationProfile = serde_json::from_str("{}").expect("empty profile");
        assert!(profile.subjects.is_empty());
        assert!(profile.work_experience.is_empty());
        assert!(profile.certificates.is_empty());
        assert_eq!(profile.transcript_url, None);
    }
}
