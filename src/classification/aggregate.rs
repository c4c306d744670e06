//! Attack statistics and per-domain log association

use super::rules::{AttackCategory, RuleTable};
use crate::models::{AttackStats, SecurityLogRecord};

/// Aggregate attack counters over a list of records using the default table
pub fn compute_stats(logs: &[SecurityLogRecord]) -> AttackStats {
    RuleTable::default().aggregate(logs)
}

impl RuleTable {
    /// Single pass over `logs`. Every record bumps `total`; a record whose
    /// rule ID is in the table also bumps its category counter.
    pub fn aggregate(&self, logs: &[SecurityLogRecord]) -> AttackStats {
        logs.iter().fold(AttackStats::default(), |mut stats, log| {
            match self.classify(log.rule_id) {
                Some(AttackCategory::Xss) => stats.xss += 1,
                Some(AttackCategory::SqlInjection) => stats.sql_injection += 1,
                Some(AttackCategory::Ddos) => stats.ddos += 1,
                None => {}
            }
            stats.total += 1;
            stats
        })
    }
}

/// Records logged for the domain called `domain_name`.
///
/// Matches a record's `agent_name` against the domain's display name,
/// exactly and case-sensitively, keeping input order.
pub fn logs_for_domain<'a>(
    domain_name: &str,
    logs: &'a [SecurityLogRecord],
) -> Vec<&'a SecurityLogRecord> {
    logs.iter()
        .filter(|log| log.agent_name.as_deref() == Some(domain_name))
        .collect()
}

/// Whether any record is tagged as an attack
pub fn has_threats<'a, I>(logs: I) -> bool
where
    I: IntoIterator<Item = &'a SecurityLogRecord>,
{
    logs.into_iter().any(|log| log.is_threat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogType;

    fn record(rule_id: Option<u32>) -> SecurityLogRecord {
        SecurityLogRecord {
            rule_id,
            timestamp: "2025-06-20T08:15:30Z".to_string(),
            ..Default::default()
        }
    }

    fn agent_record(id: &str, agent: &str) -> SecurityLogRecord {
        SecurityLogRecord {
            id: id.to_string(),
            agent_name: Some(agent.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_mixed_records() {
        let logs = vec![
            record(Some(900001)),
            record(Some(900006)),
            record(Some(900002)),
            record(None),
        ];

        let stats = compute_stats(&logs);
        assert_eq!(
            stats,
            AttackStats { xss: 1, ddos: 1, sql_injection: 1, total: 4 }
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(compute_stats(&[]), AttackStats::default());
    }

    #[test]
    fn test_total_counts_every_record() {
        let logs: Vec<_> = [Some(900001), Some(1), None, Some(900007), Some(42), None]
            .into_iter()
            .map(record)
            .collect();

        let stats = compute_stats(&logs);
        assert_eq!(stats.total, logs.len() as u64);
        assert!(stats.classified() <= stats.total);
        assert_eq!(stats.unclassified(), 4);
    }

    #[test]
    fn test_fully_classified_sums_to_total() {
        let logs: Vec<_> = RuleTable::default()
            .known_rule_ids()
            .map(|id| record(Some(id)))
            .collect();

        let stats = compute_stats(&logs);
        assert_eq!(stats.classified(), stats.total);
        assert_eq!(stats, AttackStats { xss: 4, sql_injection: 6, ddos: 2, total: 12 });
    }

    #[test]
    fn test_permutation_does_not_change_counts() {
        let mut logs: Vec<_> = [Some(900013), None, Some(900005), Some(900006), Some(7), Some(900009)]
            .into_iter()
            .map(record)
            .collect();

        let forward = compute_stats(&logs);
        logs.reverse();
        let reversed = compute_stats(&logs);
        logs.rotate_left(2);
        let rotated = compute_stats(&logs);

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_domain_filter_keeps_order() {
        let logs = vec![
            agent_record("a", "example.com"),
            agent_record("b", "other.com"),
            agent_record("c", "example.com"),
        ];

        let matched = logs_for_domain("example.com", &logs);
        let ids: Vec<&str> = matched.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_domain_filter_is_exact() {
        let logs = vec![
            agent_record("a", "Example.com"),
            agent_record("b", "example.com "),
            SecurityLogRecord::default(),
        ];

        assert!(logs_for_domain("example.com", &logs).is_empty());
    }

    #[test]
    fn test_has_threats() {
        let clean = SecurityLogRecord {
            log_type: Some(LogType::Clean),
            ..Default::default()
        };
        let xss = SecurityLogRecord {
            log_type: Some(LogType::Xss),
            ..Default::default()
        };

        assert!(!has_threats(&[clean.clone()]));
        assert!(has_threats(&[clean, xss]));
        assert!(!has_threats(Vec::<SecurityLogRecord>::new().iter()));
    }
}
