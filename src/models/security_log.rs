use serde::{Deserialize, Serialize};
use std::fmt;

/// Display tag attached to a security log record by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    SqlInjection,
    Ddos,
    Xss,
    Clean,
    NoThreats,
    Monitoring,
}

impl LogType {
    /// Whether this tag marks an attack rather than benign traffic
    pub fn is_threat(&self) -> bool {
        matches!(self, LogType::SqlInjection | LogType::Ddos | LogType::Xss)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::SqlInjection => "sql_injection",
            LogType::Ddos => "ddos",
            LogType::Xss => "xss",
            LogType::Clean => "clean",
            LogType::NoThreats => "no_threats",
            LogType::Monitoring => "monitoring",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A security event as returned by `/api/security-logs`.
///
/// Records are forwarded from Wazuh, so almost every field is optional on
/// the wire. Only `rule_id` drives classification and only `agent_name`
/// ties a record to a domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityLogRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "domainId", default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub log_type: Option<LogType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(rename = "ipAddress", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub blocked: bool,

    // Wazuh agent and rule metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
}

impl SecurityLogRecord {
    /// Whether the record carries one of the attack tags
    pub fn is_threat(&self) -> bool {
        self.log_type.map(|t| t.is_threat()).unwrap_or(false)
    }
}
