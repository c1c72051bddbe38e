use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of records seeded into the store for one benchmark size.
pub type RecordSize = u64;

/// Data-access approach under measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Orm,
    Sql,
}

impl Strategy {
    pub const BOTH: [Strategy; 2] = [Strategy::Orm, Strategy::Sql];

    /// Prefix used in sample file names, directory names and column names.
    pub fn prefix(self) -> &'static str {
        match self {
            Strategy::Orm => "orm",
            Strategy::Sql => "sql",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Measurement column tracked per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    CpuEnergy,
    RamEnergy,
    EnergyConsumed,
    Duration,
}

impl Metric {
    /// Column order used by every summary file.
    pub const ALL: [Metric; 4] = [
        Metric::CpuEnergy,
        Metric::RamEnergy,
        Metric::EnergyConsumed,
        Metric::Duration,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::CpuEnergy => "cpu_energy",
            Metric::RamEnergy => "ram_energy",
            Metric::EnergyConsumed => "energy_consumed",
            Metric::Duration => "duration",
        }
    }

    /// Energy metrics carry a joule-converted average; duration does not.
    pub fn is_energy(self) -> bool {
        !matches!(self, Metric::Duration)
    }
}

/// Canonical display and join order of benchmarked operations.
///
/// Operations outside the list rank after every listed one and fall back to
/// lexical order among themselves, so sorting stays total and deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct OperationOrder {
    names: Vec<String>,
    #[serde(skip)]
    ranks: HashMap<String, usize>,
}

impl OperationOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut ranks = HashMap::new();
        for name in names {
            let name = name.into();
            if !ranks.contains_key(&name) {
                ranks.insert(name.clone(), ordered.len());
                ordered.push(name);
            }
        }
        Self {
            names: ordered,
            ranks,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rank(&self, operation: &str) -> Option<usize> {
        self.ranks.get(operation).copied()
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.ranks.contains_key(operation)
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }

    /// Listed operations followed by any extra names seen in the data.
    pub fn with_extras<'a, I>(&self, seen: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut extras: Vec<String> = seen
            .into_iter()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect();
        extras.sort();
        extras.dedup();

        let mut all = self.names.clone();
        all.extend(extras);
        all
    }
}

impl Default for OperationOrder {
    fn default() -> Self {
        Self::new([
            "create_customer",
            "get_customers",
            "get_customer_by_id",
            "fetch_top_spending_customers",
            "update_customer_email",
            "update_many_contract_types",
            "delete_inactive_customers",
            "delete_customer_by_id",
        ])
    }
}

impl From<Vec<String>> for OperationOrder {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<OperationOrder> for Vec<String> {
    fn from(order: OperationOrder) -> Self {
        order.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_operations_follow_rank() {
        let order = OperationOrder::new(["a", "b", "c"]);
        let mut ops = vec!["b", "a"];
        ops.sort_by(|x, y| order.compare(x, y));
        assert_eq!(ops, vec!["a", "b"]);
    }

    #[test]
    fn unlisted_operations_rank_last() {
        let order = OperationOrder::new(["a", "b"]);
        let mut ops = vec!["zeta", "b", "alpha", "a"];
        ops.sort_by(|x, y| order.compare(x, y));
        assert_eq!(ops, vec!["a", "b", "alpha", "zeta"]);
    }

    #[test]
    fn duplicate_names_keep_first_rank() {
        let order = OperationOrder::new(["a", "b", "a"]);
        assert_eq!(order.names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(order.rank("b"), Some(1));
    }

    #[test]
    fn extras_are_appended_sorted() {
        let order = OperationOrder::new(["a"]);
        let all = order.with_extras(["z", "a", "m", "z"]);
        assert_eq!(all, vec!["a", "m", "z"]);
    }

    #[test]
    fn order_round_trips_through_json_list() {
        let order = OperationOrder::new(["x", "y"]);
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"["x","y"]"#);
        let back: OperationOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rank("y"), Some(1));
    }
}
