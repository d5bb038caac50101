use crate::clock::Clock;
use crate::datekey::DateKey;
use crate::score::Score;
use crate::storage::{Storage, StorageError, StoredDays};
use log::{debug, info};
use std::fmt;
use thiserror::Error;
use time::{OffsetDateTime, Time};

/// A persisted judgement on a day
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Mark {
    Green,
    Red,
}

impl Mark {
    fn toggled(self) -> Mark {
        match self {
            Mark::Green => Mark::Red,
            Mark::Red => Mark::Green,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Green => write!(f, "green"),
            Mark::Red => write!(f, "red"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum DayStatus {
    Green,
    Red,
    /// Today, not yet marked.  Only ever reported for display; never stored.
    Current,
    Unmarked,
}

impl From<Mark> for DayStatus {
    fn from(mark: Mark) -> DayStatus {
        match mark {
            Mark::Green => DayStatus::Green,
            Mark::Red => DayStatus::Red,
        }
    }
}

/// Owner of every day's mark, the install date, and the current day.
///
/// A day can be marked only if it lies between the install date and today,
/// inclusive.  Every mutation is written through to `storage` before the
/// mutating call returns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DateStateStore<S, C> {
    storage: S,
    clock: C,
    days: StoredDays,
    installed_at: OffsetDateTime,
    install_date: DateKey,
    today: DateKey,
}

impl<S: Storage, C: Clock> DateStateStore<S, C> {
    /// Load the persisted state, stamping the install date on first run.
    /// Opening the same storage again later is a no-op apart from picking up
    /// the new current day.
    pub(crate) fn open(storage: S, clock: C) -> Result<Self, StoreError> {
        let mut days = storage.load()?;
        let now = clock.now();
        let (install, fresh) = match days.install_date {
            Some(ts) => (ts, false),
            None => (now.replace_time(Time::MIDNIGHT), true),
        };
        days.install_date = Some(install);
        let mut store = DateStateStore {
            storage,
            clock,
            days,
            installed_at: install,
            install_date: day_in_offset_of(install, now),
            today: DateKey::from(now.date()),
        };
        if fresh {
            info!("First run; setting install date to {}", store.install_date);
            store.persist()?;
        }
        debug!(
            "Opened store: install date {}, today {}, {} marked days",
            store.install_date,
            store.today,
            store.days.marks.len()
        );
        Ok(store)
    }

    pub(crate) fn install_date(&self) -> DateKey {
        self.install_date
    }

    pub(crate) fn today(&self) -> DateKey {
        self.today
    }

    pub(crate) fn can_interact(&self, date: DateKey) -> bool {
        self.install_date <= date && date <= self.today
    }

    pub(crate) fn status_of(&self, date: DateKey) -> DayStatus {
        match self.days.marks.get(&date) {
            Some(&mark) => mark.into(),
            None if date == self.today => DayStatus::Current,
            None => DayStatus::Unmarked,
        }
    }

    /// Advance an unmarked or red day to green, or a green day to red.
    ///
    /// Days that cannot be interacted with are left alone and their current
    /// status is returned.  If the new state cannot be saved, the change is
    /// still kept in memory for the rest of the session and the storage
    /// failure is returned.
    pub(crate) fn toggle(&mut self, date: DateKey) -> Result<DayStatus, StoreError> {
        if !self.can_interact(date) {
            debug!("Ignoring toggle of {date} outside {}..={}", self.install_date, self.today);
            return Ok(self.status_of(date));
        }
        let mark = self
            .days
            .marks
            .get(&date)
            .map_or(Mark::Green, |&m| m.toggled());
        self.days.marks.insert(date, mark);
        info!("Marked {date} {mark}");
        self.persist()?;
        Ok(mark.into())
    }

    /// Re-read the current day from the clock.  Returns `true` if it changed.
    ///
    /// The install day is re-derived as well, since it is the install
    /// instant's calendar day in whatever offset the clock now uses.
    pub(crate) fn refresh_today(&mut self) -> bool {
        let now = self.clock.now();
        let today = DateKey::from(now.date());
        let install_date = day_in_offset_of(self.installed_at, now);
        if install_date != self.install_date {
            info!(
                "UTC offset changed to {}; install day is now {install_date}",
                now.offset()
            );
            self.install_date = install_date;
        }
        if today == self.today {
            false
        } else {
            info!("Day changed from {} to {today}", self.today);
            self.today = today;
            true
        }
    }

    /// Number of days from the install date through today, inclusive; never
    /// less than 1
    pub(crate) fn total_available_days(&self) -> usize {
        let span = self.today.days_since(self.install_date);
        usize::try_from(span.saturating_add(1)).unwrap_or(0).max(1)
    }

    pub(crate) fn total_marked_days(&self) -> usize {
        self.days.marks.len()
    }

    pub(crate) fn green_count(&self) -> usize {
        self.count(Mark::Green)
    }

    pub(crate) fn red_count(&self) -> usize {
        self.count(Mark::Red)
    }

    /// Percentage of marked days that are green, rounded up; `None` if no day
    /// has been marked
    pub(crate) fn score_percent(&self) -> Option<usize> {
        let marked = self.total_marked_days();
        (marked > 0).then(|| (self.green_count() * 100).div_ceil(marked))
    }

    pub(crate) fn score(&self) -> Score {
        Score {
            available: self.total_available_days(),
            marked: self.total_marked_days(),
            green: self.green_count(),
            red: self.red_count(),
            percent: self.score_percent(),
        }
    }

    fn count(&self, mark: Mark) -> usize {
        self.days.marks.values().filter(|&&m| m == mark).count()
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        self.storage.save(&self.days)
    }
}

/// The calendar day of `instant` as seen from `now`'s UTC offset
fn day_in_offset_of(instant: OffsetDateTime, now: OffsetDateTime) -> DateKey {
    let local = instant.checked_to_offset(now.offset()).unwrap_or(instant);
    DateKey::from(local.date())
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("day storage is unavailable")]
    StorageUnavailable(#[from] StorageError),
}
