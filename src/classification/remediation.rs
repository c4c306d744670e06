//! Remediation advice for known rule IDs

/// Shown when a rule ID has no advice attached
pub const NO_REMEDIATION: &str = "No specific remediation available.";

/// Advice for a rule ID, if the rule is one of the twelve known signatures
pub fn remediation_for(rule_id: Option<u32>) -> Option<&'static str> {
    let advice = match rule_id? {
        900001 => "Ensure input fields are sanitized to prevent XSS attacks.",
        900011 => "Review JavaScript usage to avoid potential XSS vulnerabilities.",
        900012 => "Implement Content Security Policy (CSP) to mitigate XSS risks.",
        900013 => "Validate and escape user input to prevent XSS attacks.",
        900002 => "Use parameterized queries to prevent SQL injection.",
        900003 => "Avoid dynamic SQL queries to reduce SQL injection risks.",
        900004 => "Sanitize user inputs to prevent SQL injection.",
        900005 => "Implement database access controls to mitigate SQL injection.",
        900008 => "Monitor database queries for unusual patterns.",
        900009 => "Use an ORM to abstract database queries and prevent SQL injection.",
        900006 => "Implement rate limiting to mitigate DDoS attacks.",
        900007 => "Use a web application firewall (WAF) to block DDoS traffic.",
        _ => return None,
    };
    Some(advice)
}

/// Advice for a rule ID, falling back to [`NO_REMEDIATION`]
pub fn remediation_text(rule_id: Option<u32>) -> &'static str {
    remediation_for(rule_id).unwrap_or(NO_REMEDIATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::RuleTable;

    #[test]
    fn test_every_known_rule_has_advice() {
        for id in RuleTable::default().known_rule_ids() {
            assert!(remediation_for(Some(id)).is_some(), "missing advice for {}", id);
        }
    }

    #[test]
    fn test_specific_advice() {
        assert_eq!(
            remediation_text(Some(900002)),
            "Use parameterized queries to prevent SQL injection."
        );
        assert_eq!(
            remediation_text(Some(900007)),
            "Use a web application firewall (WAF) to block DDoS traffic."
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(remediation_text(None), NO_REMEDIATION);
        assert_eq!(remediation_text(Some(31101)), NO_REMEDIATION);
        assert!(remediation_for(Some(0)).is_none());
    }
}
