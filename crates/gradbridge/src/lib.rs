//! Admission and recruitment lifecycle engine for a multi-tenant campus
//! platform. Students apply to institution courses and company jobs; the
//! workflows here own eligibility screening, application state, waitlist
//! placement, qualification scoring, and notification fan-out.

pub mod config;
pub mod directory;
pub mod error;
pub mod memory;
pub mod notify;
pub mod telemetry;
pub mod workflows;
