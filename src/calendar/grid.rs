use std::iter::successors;
use time::{error::ComponentRange, Date, Duration, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) const WEEKS_IN_GRID: u16 = 6;

pub(crate) const GRID_CELLS: usize = DAYS_IN_WEEK * WEEKS_IN_GRID as usize;

pub(crate) trait WeekdayExt {
    fn index0(&self) -> u16;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u16 {
        self.number_days_from_sunday().into()
    }
}

/// The days of one month laid out as six Sunday-first weeks.  The first row
/// is the week containing the 1st; cells belonging to the neighboring months
/// are `None`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    year: i32,
    month: Month,
    cells: [Option<Date>; GRID_CELLS],
}

impl MonthGrid {
    pub(crate) fn for_month(year: i32, month: Month) -> Result<MonthGrid, ComponentRange> {
        Date::from_calendar_date(year, month, 1).map(MonthGrid::from_first)
    }

    pub(crate) fn containing(date: Date) -> MonthGrid {
        let first = iter_days_before(date)
            .take_while(|d| d.month() == date.month())
            .last()
            .unwrap_or(date);
        MonthGrid::from_first(first)
    }

    fn from_first(first: Date) -> MonthGrid {
        let lead = i64::from(first.weekday().index0());
        let cells = std::array::from_fn(|i| {
            let offset = i64::try_from(i).ok()? - lead;
            if offset < 0 {
                return None;
            }
            first
                .checked_add(Duration::days(offset))
                .filter(|d| d.month() == first.month())
        });
        MonthGrid {
            year: first.year(),
            month: first.month(),
            cells,
        }
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn cells(&self) -> &[Option<Date>; GRID_CELLS] {
        &self.cells
    }

    pub(crate) fn weeks(&self) -> impl Iterator<Item = &[Option<Date>]> + '_ {
        self.cells.chunks(DAYS_IN_WEEK)
    }
}

pub(super) fn iter_days_before(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.previous_day()).skip(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    /// (week, weekday) coordinates of `date` in `grid`
    fn position(grid: &MonthGrid, date: Date) -> Option<(usize, usize)> {
        let i = grid.cells().iter().position(|&c| c == Some(date))?;
        Some((i / DAYS_IN_WEEK, i % DAYS_IN_WEEK))
    }

    fn days(grid: &MonthGrid) -> Vec<Option<u8>> {
        grid.cells().iter().map(|c| c.map(|d| d.day())).collect()
    }

    #[test]
    fn test_january_2024() {
        let grid = MonthGrid::for_month(2024, Month::January).unwrap();
        assert_eq!(grid.year(), 2024);
        assert_eq!(grid.month(), Month::January);
        let cells = days(&grid);
        assert_eq!(cells.len(), 42);
        // January 1st, 2024 was a Monday
        assert_eq!(cells[0], None);
        assert_eq!(cells[1], Some(1));
        assert_eq!(cells[31], Some(31));
        assert!(cells[32..].iter().all(Option::is_none));
        assert_eq!(position(&grid, date!(2024 - 01 - 12)), Some((1, 5)));
        assert_eq!(position(&grid, date!(2024 - 02 - 01)), None);
    }

    #[test]
    fn test_month_starting_on_sunday() {
        let grid = MonthGrid::for_month(2015, Month::February).unwrap();
        let cells = days(&grid);
        assert_eq!(cells[0], Some(1));
        assert_eq!(cells[27], Some(28));
        assert!(cells[28..].iter().all(Option::is_none));
        assert_eq!(grid.weeks().filter(|w| w.iter().any(Option::is_some)).count(), 4);
    }

    #[test]
    fn test_month_needing_six_weeks() {
        // March 1st, 2025 was a Saturday
        let grid = MonthGrid::for_month(2025, Month::March).unwrap();
        let weeks = grid.weeks().collect::<Vec<_>>();
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0][6], Some(date!(2025 - 03 - 01)));
        assert_eq!(weeks[5][1], Some(date!(2025 - 03 - 31)));
        assert_eq!(weeks[5][2], None);
    }

    #[test]
    fn test_leap_february() {
        let grid = MonthGrid::for_month(2024, Month::February).unwrap();
        let present = grid.cells().iter().flatten().count();
        assert_eq!(present, 29);
    }

    #[test]
    fn test_containing_matches_for_month() {
        for d in [
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 12),
            date!(2024 - 01 - 31),
            date!(2025 - 03 - 15),
        ] {
            assert_eq!(
                MonthGrid::containing(d),
                MonthGrid::for_month(d.year(), d.month()).unwrap()
            );
        }
    }

    #[test]
    fn test_cells_in_order() {
        let grid = MonthGrid::for_month(2026, Month::October).unwrap();
        let dates = grid.cells().iter().flatten().copied().collect::<Vec<_>>();
        assert_eq!(dates.len(), 31);
        assert!(dates.windows(2).all(|w| w[0].next_day() == Some(w[1])));
        // October 1st, 2026 is a Thursday
        assert_eq!(position(&grid, date!(2026 - 10 - 01)), Some((0, 4)));
    }

    #[test]
    fn test_out_of_range_month() {
        assert!(MonthGrid::for_month(100_000, Month::January).is_err());
    }
}
