//! Human-readable formatting of log records and counters

use crate::classification::remediation_text;
use crate::models::{LogType, SecurityLogRecord};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

/// Parse the timestamp shapes the API is known to emit
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    // Wazuh writes offsets without a colon, e.g. `+0000`
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `[h:mm:ss AM]` in the given zone; unparseable input is shown as-is
/// between the brackets
pub fn format_timestamp_in<Tz>(raw: &str, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(ts) => format!("[{}]", ts.with_timezone(zone).format("%-I:%M:%S %p")),
        None => format!("[{}]", raw),
    }
}

/// [`format_timestamp_in`] for the local zone
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

/// Headline for a record: `"<title> from <srcip>"` when the record names a
/// rule and a source address, otherwise just the title
pub fn log_message(log: &SecurityLogRecord) -> String {
    let title = log
        .title
        .as_deref()
        .or(log.message.as_deref())
        .unwrap_or_default();

    match (log.rule_id, log.srcip.as_deref()) {
        (Some(_), Some(srcip)) if !srcip.is_empty() => format!("{} from {}", title, srcip),
        _ => title.to_string(),
    }
}

/// `Rule ID: <id> | Status: <code> | BLOCKED` for records with a rule,
/// except monitoring records
pub fn rule_detail(log: &SecurityLogRecord) -> Option<String> {
    let rule_id = log.rule_id?;
    if log.log_type == Some(LogType::Monitoring) {
        return None;
    }

    let status = log
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "-".to_string());
    let verdict = if log.blocked { "BLOCKED" } else { "ALLOWED" };

    Some(format!("Rule ID: {} | Status: {} | {}", rule_id, status, verdict))
}

/// `Threat Remediation: <advice>` for records with a rule
pub fn remediation_line(log: &SecurityLogRecord) -> Option<String> {
    log.rule_id
        .map(|id| format!("Threat Remediation: {}", remediation_text(Some(id))))
}

/// Caption under an attack counter
pub fn attack_caption(count: u64) -> String {
    match count {
        0 => "No attacks detected".to_string(),
        1 => "1 attack detected".to_string(),
        n => format!("{} attacks detected", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule_log(rule_id: u32) -> SecurityLogRecord {
        SecurityLogRecord {
            rule_id: Some(rule_id),
            title: Some("SQL injection attempt".to_string()),
            srcip: Some("203.0.113.9".to_string()),
            status_code: Some(403),
            blocked: true,
            log_type: Some(LogType::SqlInjection),
            ..Default::default()
        }
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            format_timestamp_in("2025-06-20T08:05:09Z", &Utc),
            "[8:05:09 AM]"
        );
        assert_eq!(
            format_timestamp_in("2025-06-20T20:15:30.000+0000", &Utc),
            "[8:15:30 PM]"
        );
        assert_eq!(
            format_timestamp_in("2025-01-02 00:00:01", &Utc),
            "[12:00:01 AM]"
        );
        assert_eq!(format_timestamp_in("yesterday", &Utc), "[yesterday]");

        let ts = "2025-06-20T23:30:00Z";
        let offset = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_timestamp_in(ts, &offset), "[1:30:00 AM]");
    }

    #[test]
    fn test_log_message() {
        assert_eq!(log_message(&rule_log(900002)), "SQL injection attempt from 203.0.113.9");

        let heartbeat = SecurityLogRecord {
            title: Some("Agent heartbeat".to_string()),
            srcip: Some("10.0.0.1".to_string()),
            ..Default::default()
        };
        assert_eq!(log_message(&heartbeat), "Agent heartbeat");
    }

    #[test]
    fn test_rule_detail() {
        assert_eq!(
            rule_detail(&rule_log(900002)).as_deref(),
            Some("Rule ID: 900002 | Status: 403 | BLOCKED")
        );

        let mut monitoring = rule_log(900002);
        monitoring.log_type = Some(LogType::Monitoring);
        assert!(rule_detail(&monitoring).is_none());

        assert!(rule_detail(&SecurityLogRecord::default()).is_none());
    }

    #[test]
    fn test_remediation_line() {
        assert_eq!(
            remediation_line(&rule_log(900006)).as_deref(),
            Some("Threat Remediation: Implement rate limiting to mitigate DDoS attacks.")
        );
        assert_eq!(
            remediation_line(&rule_log(1234)).as_deref(),
            Some("Threat Remediation: No specific remediation available.")
        );
        assert!(remediation_line(&SecurityLogRecord::default()).is_none());
    }

    #[test]
    fn test_attack_caption() {
        assert_eq!(attack_caption(0), "No attacks detected");
        assert_eq!(attack_caption(1), "1 attack detected");
        assert_eq!(attack_caption(12), "12 attacks detected");
    }
}
