use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// Source of wall-clock time for the last-updated label.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// "2025년 2월 7일 09:05:03": month and day unpadded, time always two digits
pub fn format_timestamp(time: NaiveDateTime) -> String {
    format!(
        "{}년 {}월 {}일 {:02}:{:02}:{:02}",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    )
}

pub struct Formatter<C: Clock> {
    clock: C,
}

impl<C: Clock> Formatter<C> {
    pub fn new(clock: C) -> Self {
        Formatter { clock }
    }

    pub fn now(&self) -> String {
        format_timestamp(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_fixed_clock_format() {
        let formatter = Formatter::new(FixedClock(at(2025, 2, 7, 9, 5, 3)));
        assert_eq!(formatter.now(), "2025년 2월 7일 09:05:03");
    }

    #[test]
    fn test_two_digit_fields_are_not_truncated() {
        assert_eq!(
            format_timestamp(at(2024, 12, 31, 23, 59, 58)),
            "2024년 12월 31일 23:59:58"
        );
        assert_eq!(
            format_timestamp(at(2025, 1, 1, 0, 0, 0)),
            "2025년 1월 1일 00:00:00"
        );
    }

    #[test]
    fn test_system_clock_shape() {
        let formatted = Formatter::new(SystemClock).now();
        assert!(formatted.contains('년'));
        assert!(formatted.contains('월'));
        assert!(formatted.contains('일'));
        assert_eq!(formatted.matches(':').count(), 2);
    }
}
