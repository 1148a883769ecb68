pub mod admissions;
pub mod recruitment;
