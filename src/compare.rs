use crate::types::Strategy;

/// Placeholder emitted when a ratio is undefined.
pub const NOT_AVAILABLE: &str = "n/a";

/// Relative difference of the ORM value against the SQL value, in percent.
pub fn percent_diff(orm: f64, sql: f64) -> f64 {
    (orm - sql) / sql * 100.0
}

fn winner(orm: f64, sql: f64) -> Strategy {
    if orm > sql { Strategy::Orm } else { Strategy::Sql }
}

/// `"{winner} {percent}%"` where the winner is the strategy with the larger
/// value, or `n/a` when either side is zero.
pub fn format_result(orm_avg: f64, sql_avg: f64) -> String {
    if orm_avg == 0.0 || sql_avg == 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    let diff = percent_diff(orm_avg, sql_avg);
    format!(
        "{} {:.0}%",
        winner(orm_avg, sql_avg),
        diff.round_ties_even().abs()
    )
}

/// `"{winner} {multiplier}x ({percent}%)"`, e.g. `orm 2.3x (130%)`.
pub fn format_delta(orm_joules: f64, sql_joules: f64) -> String {
    if orm_joules == 0.0 || sql_joules == 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    let diff = percent_diff(orm_joules, sql_joules);
    let label = winner(orm_joules, sql_joules);
    let multiplier = match label {
        Strategy::Orm => orm_joules / sql_joules,
        Strategy::Sql => sql_joules / orm_joules,
    };
    format!("{label} {multiplier:.1}x ({:.0}%)", diff.abs())
}
