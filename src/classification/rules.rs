//! Rule ID table used to classify security log records

use serde::{Deserialize, Serialize};
use std::fmt;

pub const XSS_RULE_IDS: [u32; 4] = [900001, 900011, 900012, 900013];
pub const SQL_INJECTION_RULE_IDS: [u32; 6] = [900002, 900003, 900004, 900005, 900008, 900009];
pub const DDOS_RULE_IDS: [u32; 2] = [900006, 900007];

/// Attack family a rule ID belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackCategory {
    Xss,
    SqlInjection,
    Ddos,
}

impl fmt::Display for AttackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttackCategory::Xss => "XSS",
            AttackCategory::SqlInjection => "SQL Injection",
            AttackCategory::Ddos => "DDoS",
        };
        f.write_str(label)
    }
}

/// Rule ID sets for each attack category.
///
/// Lookup order is XSS, then SQL injection, then DDoS. The default table has
/// no overlap, but an extended table resolves a shared ID to the first set
/// that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    xss: Vec<u32>,
    sql_injection: Vec<u32>,
    ddos: Vec<u32>,
}

impl RuleTable {
    pub fn new(xss: Vec<u32>, sql_injection: Vec<u32>, ddos: Vec<u32>) -> Self {
        RuleTable {
            xss,
            sql_injection,
            ddos,
        }
    }

    /// Classify a record's rule ID; records without one are unclassified
    pub fn classify(&self, rule_id: Option<u32>) -> Option<AttackCategory> {
        let id = rule_id?;
        if self.xss.contains(&id) {
            Some(AttackCategory::Xss)
        } else if self.sql_injection.contains(&id) {
            Some(AttackCategory::SqlInjection)
        } else if self.ddos.contains(&id) {
            Some(AttackCategory::Ddos)
        } else {
            None
        }
    }

    /// Every rule ID known to the table, in lookup order
    pub fn known_rule_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.xss
            .iter()
            .chain(self.sql_injection.iter())
            .chain(self.ddos.iter())
            .copied()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        RuleTable::new(
            XSS_RULE_IDS.to_vec(),
            SQL_INJECTION_RULE_IDS.to_vec(),
            DDOS_RULE_IDS.to_vec(),
        )
    }
}
