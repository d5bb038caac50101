use crate::datekey::DateKey;
use time::{error::IndeterminateOffset, OffsetDateTime, UtcOffset};

/// Source of the current instant.  The store never reads the system time
/// directly, so day rollover can be driven by hand in tests.
pub(crate) trait Clock {
    fn now(&self) -> OffsetDateTime;

    fn today(&self) -> DateKey {
        DateKey::from(self.now().date())
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

/// Wall clock pinned to the UTC offset that was in effect at startup.
///
/// The offset is never re-queried: once the logger's flush thread is running
/// the local offset can no longer be read, so a session that spans a DST
/// change rolls the day over an hour early or late until restarted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    // The local offset can only be determined reliably while the process is
    // single-threaded, so this must run before the logger starts its flush
    // thread.
    pub(crate) fn local() -> Result<SystemClock, IndeterminateOffset> {
        let offset = UtcOffset::current_local_offset()?;
        Ok(SystemClock { offset })
    }

    pub(crate) fn utc() -> SystemClock {
        SystemClock {
            offset: UtcOffset::UTC,
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

#[cfg(test)]
pub(crate) use self::manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_system_clock_uses_its_offset() {
        let clock = SystemClock::utc();
        assert_eq!(clock.now().offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_manual_clock_today() {
        let clock = ManualClock::on(date!(2024 - 01 - 10));
        assert_eq!(clock.today(), DateKey::from(date!(2024 - 01 - 10)));
        clock.set(datetime!(2024-01-10 23:59:59 +05:00));
        assert_eq!(clock.today(), DateKey::from(date!(2024 - 01 - 10)));
        clock.set_date(date!(2024 - 01 - 11));
        assert_eq!((&clock).today(), DateKey::from(date!(2024 - 01 - 11)));
    }
}
