use serde::{Deserialize, Serialize};

/// Attack counters derived from a list of security log records.
///
/// `total` counts every record processed, classified or not, so the three
/// category counters never sum past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackStats {
    pub ddos: u64,
    pub sql_injection: u64,
    pub xss: u64,
    pub total: u64,
}

impl AttackStats {
    /// Sum of the three attack categories
    pub fn classified(&self) -> u64 {
        self.ddos
            .saturating_add(self.sql_injection)
            .saturating_add(self.xss)
    }

    /// Records that matched no attack category; zero when the counters were
    /// built by hand and the categories exceed `total`
    pub fn unclassified(&self) -> u64 {
        self.total.saturating_sub(self.classified())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_camel_case() {
        let stats = AttackStats { ddos: 1, sql_injection: 2, xss: 3, total: 7 };
        let json = serde_json::to_value(stats).unwrap();

        assert_eq!(json["sqlInjection"], 2);
        assert_eq!(json["ddos"], 1);
        assert_eq!(json["xss"], 3);
        assert_eq!(json["total"], 7);
    }

    #[test]
    fn test_unclassified_count() {
        let stats = AttackStats { ddos: 1, sql_injection: 1, xss: 1, total: 5 };
        assert_eq!(stats.classified(), 3);
        assert_eq!(stats.unclassified(), 2);
    }

    #[test]
    fn test_inconsistent_counters_do_not_underflow() {
        let stats: AttackStats =
            serde_json::from_str(r#"{"ddos":4,"sqlInjection":0,"xss":3,"total":2}"#).unwrap();
        assert_eq!(stats.classified(), 7);
        assert_eq!(stats.unclassified(), 0);

        let saturated = AttackStats { ddos: u64::MAX, xss: 1, ..Default::default() };
        assert_eq!(saturated.classified(), u64::MAX);
    }
}
