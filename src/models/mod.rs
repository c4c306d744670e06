pub mod domain;
pub mod security_log;
pub mod stats;
pub mod user;

pub use domain::{Domain, NewDomain};
pub use security_log::{LogType, SecurityLogRecord};
pub use stats::AttackStats;
pub use user::User;
