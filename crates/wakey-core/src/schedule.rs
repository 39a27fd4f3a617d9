//! When does an alarm fire next?
//!
//! The trigger instant is the wake time minus the effective lighting offset,
//! so a 06:10 alarm with a 20 minute sunrise triggers at 05:50. The offset
//! can push the trigger onto the previous calendar day; the wake day is what
//! `days` refers to.
//!
//! A wake time that falls in a forward clock change is read with the offset
//! in force before the change, so it fires just after the gap rather than
//! being skipped for that day.

use crate::types::AlarmDefinition;
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Offset, TimeZone};

/// Days to look ahead. Covers a full week plus a wake time that lies
/// tomorrow but triggers today.
const LOOKAHEAD_DAYS: i64 = 8;

/// Next trigger instant strictly after `now`, or `None` when the alarm is
/// disabled or has no days.
pub fn next_trigger<Tz: TimeZone>(alarm: &AlarmDefinition, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    if !alarm.enabled || alarm.days.is_empty() {
        return None;
    }
    let offset = Duration::minutes(i64::from(alarm.lighting.effective_offset_minutes()));
    let tz = now.timezone();
    let today = now.date_naive();

    (0..=LOOKAHEAD_DAYS)
        .filter_map(|delta| today.checked_add_signed(Duration::days(delta)))
        .filter(|day| alarm.days.contains(&day.weekday()))
        .filter_map(|day| resolve_local(&tz, day.and_time(alarm.time)))
        .map(|wake| wake - offset)
        .find(|trigger| trigger > now)
}

/// Local wall time to an instant. Ambiguous times take the earlier reading.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    if let Some(at) = tz.from_local_datetime(&local).earliest() {
        return Some(at);
    }
    let before = tz.from_local_datetime(&(local - Duration::days(1))).earliest()?;
    let utc = local - Duration::seconds(i64::from(before.offset().fix().local_minus_utc()));
    Some(tz.from_utc_datetime(&utc))
}

/// Earliest trigger across `alarms`, paired with the alarm that owns it.
pub fn next_fire_time<'a, Tz: TimeZone>(
    alarms: &'a [AlarmDefinition],
    now: &DateTime<Tz>,
) -> Option<(&'a AlarmDefinition, DateTime<Tz>)> {
    alarms
        .iter()
        .filter_map(|a| next_trigger(a, now).map(|t| (a, t)))
        .min_by(|(_, a), (_, b)| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlarmDefinition;
    use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveTime, Utc, Weekday};

    fn alarm(hh: u32, mm: u32, offset: u32) -> AlarmDefinition {
        let mut a = AlarmDefinition::new(NaiveTime::from_hms_opt(hh, mm, 0).unwrap());
        a.lighting.offset_minutes = offset;
        a.lighting.enabled = offset > 0;
        a.days = vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        a
    }

    fn utc(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
    }

    #[test]
    fn later_today() {
        let a = alarm(7, 0, 0);
        // 2026-03-02 is a Monday
        let next = next_trigger(&a, &utc(2026, 3, 2, 6, 0)).unwrap();
        assert_eq!(next, utc(2026, 3, 2, 7, 0));
    }

    #[test]
    fn passed_today_rolls_to_tomorrow() {
        let a = alarm(7, 0, 0);
        let next = next_trigger(&a, &utc(2026, 3, 2, 7, 0)).unwrap();
        assert_eq!(next, utc(2026, 3, 3, 7, 0));
    }

    #[test]
    fn offset_moves_trigger_earlier() {
        let a = alarm(6, 10, 20);
        let next = next_trigger(&a, &utc(2026, 3, 2, 5, 0)).unwrap();
        assert_eq!(next, utc(2026, 3, 2, 5, 50));
    }

    #[test]
    fn disabled_lighting_ignores_offset() {
        let mut a = alarm(6, 10, 20);
        a.lighting.enabled = false;
        let next = next_trigger(&a, &utc(2026, 3, 2, 5, 0)).unwrap();
        assert_eq!(next, utc(2026, 3, 2, 6, 10));
    }

    #[test]
    fn offset_crossing_midnight_triggers_previous_evening() {
        let mut a = alarm(0, 10, 30);
        a.days = vec![Weekday::Tue];
        // Monday 23:00: Tuesday's 00:10 wake triggers Monday 23:40.
        let next = next_trigger(&a, &utc(2026, 3, 2, 23, 0)).unwrap();
        assert_eq!(next, utc(2026, 3, 2, 23, 40));
    }

    #[test]
    fn weekday_filter_skips_weekend() {
        let mut a = alarm(7, 0, 0);
        a.days = vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];
        // Saturday 2026-03-07
        let next = next_trigger(&a, &utc(2026, 3, 7, 8, 0)).unwrap();
        assert_eq!(next, utc(2026, 3, 9, 7, 0));
    }

    #[test]
    fn single_day_a_week_later() {
        let mut a = alarm(7, 0, 0);
        a.days = vec![Weekday::Mon];
        let next = next_trigger(&a, &utc(2026, 3, 2, 7, 30)).unwrap();
        assert_eq!(next, utc(2026, 3, 9, 7, 0));
    }

    #[test]
    fn disabled_or_dayless_never_fires() {
        let mut a = alarm(7, 0, 0);
        a.enabled = false;
        assert!(next_trigger(&a, &utc(2026, 3, 2, 6, 0)).is_none());

        let mut b = alarm(7, 0, 0);
        b.days.clear();
        assert!(next_trigger(&b, &utc(2026, 3, 2, 6, 0)).is_none());
    }

    #[test]
    fn next_fire_time_picks_earliest() {
        let mut early = alarm(6, 30, 20);
        early.id = "early".into();
        let mut late = alarm(6, 0, 0);
        late.id = "late".into();
        let mut off = alarm(5, 0, 0);
        off.id = "off".into();
        off.enabled = false;

        let alarms = vec![late, early, off];
        let (a, t) = next_fire_time(&alarms, &utc(2026, 3, 2, 5, 0)).unwrap();
        assert_eq!(a.id, "late");
        assert_eq!(t, utc(2026, 3, 2, 6, 0));

        let (a, t) = next_fire_time(&alarms, &utc(2026, 3, 2, 6, 0)).unwrap();
        assert_eq!(a.id, "early");
        assert_eq!(t, utc(2026, 3, 2, 6, 10));
    }

    #[test]
    fn next_fire_time_empty() {
        assert!(next_fire_time(&[], &utc(2026, 3, 2, 5, 0)).is_none());
    }

    /// UTC+1 until 2026-03-29 01:00 UTC, UTC+2 after. Local 02:00..03:00 on
    /// that day does not exist.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn switch() -> NaiveDateTime {
            utc(2026, 3, 29, 1, 0).naive_utc()
        }
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }
        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7200).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::switch() + Duration::hours(1);
            let gap_end = Self::switch() + Duration::hours(2);
            if *local < gap_start {
                LocalResult::Single(Self::winter())
            } else if *local < gap_end {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn wake_time_in_clock_gap_fires_after_the_jump() {
        let a = alarm(2, 30, 0);
        let now = SpringForward.with_ymd_and_hms(2026, 3, 28, 23, 0, 0).unwrap();
        let next = next_trigger(&a, &now).unwrap();
        // Read as 02:30+01:00, which the clock shows as 03:30 that morning.
        assert_eq!(next.with_timezone(&Utc), utc(2026, 3, 29, 1, 30));
        assert_eq!(next.naive_local().to_string(), "2026-03-29 03:30:00");
    }

    #[test]
    fn sunrise_offset_applies_to_gap_wake_time() {
        let a = alarm(2, 30, 20);
        let now = SpringForward.with_ymd_and_hms(2026, 3, 28, 23, 0, 0).unwrap();
        let next = next_trigger(&a, &now).unwrap();
        assert_eq!(next.with_timezone(&Utc), utc(2026, 3, 29, 1, 10));
    }

    #[test]
    fn day_after_clock_change_uses_new_offset() {
        let a = alarm(2, 30, 0);
        let now = SpringForward.with_ymd_and_hms(2026, 3, 29, 12, 0, 0).unwrap();
        let next = next_trigger(&a, &now).unwrap();
        assert_eq!(next.with_timezone(&Utc), utc(2026, 3, 30, 0, 30));
    }
}
