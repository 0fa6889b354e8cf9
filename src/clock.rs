use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Time source for anything that stamps a date or time into output.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now: DateTime<Local> = Local::now();
        now.naive_local()
    }
}

/// Always answers the same instant. Used where output has to be reproducible.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

#[allow(dead_code)]
impl FixedClock {
    pub fn at(date: NaiveDate, hour: u32, min: u32, sec: u32) -> Self {
        let t = date
            .and_hms_opt(hour, min, sec)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
        FixedClock(t)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
