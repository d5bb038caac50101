use super::grid::MonthGrid;
use thiserror::Error;
use time::{Date, Duration, Month};

/// Which month is on screen and which day in it is selected.  The visible
/// month is always the one containing the cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthPager {
    today: Date,
    cursor: Date,
}

impl MonthPager {
    pub(crate) fn new(today: Date) -> Self {
        MonthPager {
            today,
            cursor: today,
        }
    }

    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.cursor = date;
        self
    }

    pub(crate) fn today(&self) -> Date {
        self.today
    }

    pub(crate) fn cursor(&self) -> Date {
        self.cursor
    }

    pub(crate) fn grid(&self) -> MonthGrid {
        MonthGrid::containing(self.cursor)
    }

    /// Update the current day.  A cursor that was sitting on the old current
    /// day moves along with it.
    pub(crate) fn set_today(&mut self, today: Date) {
        if self.cursor == self.today {
            self.cursor = today;
        }
        self.today = today;
    }

    pub(crate) fn move_days(&mut self, days: i64) -> Result<(), OutOfTimeError> {
        self.cursor = self
            .cursor
            .checked_add(Duration::days(days))
            .ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn one_month_forwards(&mut self) -> Result<(), OutOfTimeError> {
        let (year, month) = match self.cursor.month() {
            Month::December => (self.cursor.year() + 1, Month::January),
            m => (self.cursor.year(), m.next()),
        };
        self.shift_month(year, month)
    }

    pub(crate) fn one_month_backwards(&mut self) -> Result<(), OutOfTimeError> {
        let (year, month) = match self.cursor.month() {
            Month::January => (self.cursor.year() - 1, Month::December),
            m => (self.cursor.year(), m.previous()),
        };
        self.shift_month(year, month)
    }

    // Keeps the day of the month where possible, otherwise lands on the
    // month's last day
    fn shift_month(&mut self, year: i32, month: Month) -> Result<(), OutOfTimeError> {
        let grid = MonthGrid::for_month(year, month).map_err(|_| OutOfTimeError)?;
        let day = self.cursor.day();
        if let Some(&date) = grid
            .cells()
            .iter()
            .flatten()
            .take_while(|d| d.day() <= day)
            .last()
        {
            self.cursor = date;
        }
        Ok(())
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.cursor = self.today;
    }

    pub(crate) fn jump_to_date(&mut self, date: Date) {
        self.cursor = date;
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_move_days() {
        let mut pager = MonthPager::new(date!(2024 - 01 - 12));
        pager.move_days(-1).unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 01 - 11));
        pager.move_days(7).unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 01 - 18));
        pager.move_days(14).unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 02 - 01));
        assert_eq!(pager.grid().month(), Month::February);
        assert_eq!(pager.today(), date!(2024 - 01 - 12));
    }

    #[test]
    fn test_month_steps_clamp_day() {
        let mut pager = MonthPager::new(date!(2024 - 01 - 31));
        pager.one_month_forwards().unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 02 - 29));
        pager.one_month_forwards().unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 03 - 29));
        pager.one_month_backwards().unwrap();
        pager.one_month_backwards().unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 01 - 29));
    }

    #[test]
    fn test_month_steps_cross_years() {
        let mut pager = MonthPager::new(date!(2024 - 12 - 15));
        pager.one_month_forwards().unwrap();
        assert_eq!(pager.cursor(), date!(2025 - 01 - 15));
        pager.one_month_backwards().unwrap();
        pager.one_month_backwards().unwrap();
        assert_eq!(pager.cursor(), date!(2024 - 11 - 15));
    }

    #[test]
    fn test_end_of_time() {
        let mut pager = MonthPager::new(date!(2024 - 01 - 12)).start_date(date!(9999 - 12 - 30));
        assert_eq!(pager.one_month_forwards(), Err(OutOfTimeError));
        assert_eq!(pager.move_days(7), Err(OutOfTimeError));
        assert_eq!(pager.cursor(), date!(9999 - 12 - 30));
        pager.move_days(1).unwrap();
        assert_eq!(pager.cursor(), date!(9999 - 12 - 31));
    }

    #[test]
    fn test_jumps() {
        let mut pager = MonthPager::new(date!(2024 - 01 - 12));
        pager.jump_to_date(date!(2023 - 06 - 01));
        assert_eq!(pager.grid().year(), 2023);
        pager.jump_to_today();
        assert_eq!(pager.cursor(), date!(2024 - 01 - 12));
    }

    #[test]
    fn test_set_today_moves_cursor_on_today() {
        let mut pager = MonthPager::new(date!(2024 - 01 - 31));
        pager.set_today(date!(2024 - 02 - 01));
        assert_eq!(pager.cursor(), date!(2024 - 02 - 01));
        assert_eq!(pager.today(), date!(2024 - 02 - 01));
    }

    #[test]
    fn test_set_today_leaves_cursor_elsewhere() {
        let mut pager = MonthPager::new(date!(2024 - 01 - 31)).start_date(date!(2024 - 01 - 05));
        pager.set_today(date!(2024 - 02 - 01));
        assert_eq!(pager.cursor(), date!(2024 - 01 - 05));
    }
}
