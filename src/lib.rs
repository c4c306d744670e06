pub mod api;
pub mod classification;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod output;
pub mod persistence;
pub mod session;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, ReqwestTransport, Transport};
pub use classification::{compute_stats, logs_for_domain, remediation_text, RuleTable};
pub use config::Config;
pub use dashboard::{Dashboard, DomainView, LoadState};
pub use models::{AttackStats, Domain, NewDomain, SecurityLogRecord, User};
pub use persistence::{MemoryTokenStore, SqliteTokenStore, TokenStore};
pub use session::{HistoryNavigator, Navigator, SessionContext, SessionState, View};
