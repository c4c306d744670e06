//! Attack classification for security log records
//!
//! Buckets Wazuh records into XSS, SQL injection and DDoS by rule ID,
//! aggregates the counters shown on the dashboard, and associates records
//! with the domain they were logged for.

pub mod aggregate;
pub mod remediation;
pub mod rules;

pub use aggregate::{compute_stats, has_threats, logs_for_domain};
pub use remediation::{remediation_for, remediation_text, NO_REMEDIATION};
pub use rules::{AttackCategory, RuleTable};
