/// Compact uptime, e.g. `"2d 3h"`, `"4h 12m"`, `"7m"`, `"42s"`.
pub fn fmt_uptime(secs: f64) -> String {
    let secs = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    let mins  = secs / 60;
    let hours = mins / 60;
    let days  = hours / 24;

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins % 60)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        format!("{}s", secs)
    }
}

/// Percentage with two decimals, e.g. `"12.50%"`.
pub fn fmt_percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_units() {
        assert_eq!(fmt_uptime(42.9), "42s");
        assert_eq!(fmt_uptime(7.0 * 60.0 + 5.0), "7m");
        assert_eq!(fmt_uptime(4.0 * 3600.0 + 12.0 * 60.0), "4h 12m");
        assert_eq!(fmt_uptime(2.0 * 86400.0 + 3.0 * 3600.0), "2d 3h");
    }

    #[test]
    fn uptime_garbage_is_zero() {
        assert_eq!(fmt_uptime(-5.0), "0s");
        assert_eq!(fmt_uptime(f64::NAN), "0s");
    }

    #[test]
    fn percent_two_decimals() {
        assert_eq!(fmt_percent(12.5), "12.50%");
        assert_eq!(fmt_percent(0.0), "0.00%");
    }
}
