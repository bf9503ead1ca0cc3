use time::{Date, Duration};

/// Truncate a date to the Monday that starts its calendar week.
///
/// Matches ClickHouse `toMonday`, so in-memory aggregation buckets line up
/// with the warehouse's.
pub fn week_start(date: Date) -> Date {
    let offset = date.weekday().number_days_from_monday();
    date - Duration::days(offset as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_monday_is_its_own_week_start() {
        assert_eq!(week_start(date!(2022 - 01 - 03)), date!(2022 - 01 - 03));
    }

    #[test]
    fn test_week_start_crosses_year_boundary() {
        // 2022-01-01 is a Saturday
        assert_eq!(week_start(date!(2022 - 01 - 01)), date!(2021 - 12 - 27));
        assert_eq!(week_start(date!(2022 - 01 - 02)), date!(2021 - 12 - 27));
    }

    #[test]
    fn test_sunday_belongs_to_preceding_monday() {
        assert_eq!(week_start(date!(2022 - 01 - 09)), date!(2022 - 01 - 03));
    }
}
