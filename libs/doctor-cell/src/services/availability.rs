use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::models::{AvailableSlot, DateKey, DaySlots, Doctor, SlotSchedule, SlotStartPolicy, SlotsBooked};

/// Source of "now" for slot computation, in clinic-local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Formats a slot time the way the backend keys booked slots: `2:30 PM`.
pub fn format_slot_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Parses `h:mm AM/PM` (hour may be padded, meridiem in any case).
pub fn parse_slot_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%I:%M %p").ok()
}

/// Computes the bookable slots for `schedule.days` days starting at `now`'s date.
///
/// Day 0 starts at the time chosen by the schedule's start policy, every other day
/// at opening. Slots step by the schedule interval and stop before closing. Times
/// present in the doctor's `slots_booked` for that date are left out. Without a
/// doctor every day is empty.
pub fn compute_day_slots(
    doctor: Option<&Doctor>,
    now: NaiveDateTime,
    schedule: &SlotSchedule,
) -> DaySlots {
    let Some(doctor) = doctor else {
        debug!("No doctor record, producing empty slot lists");
        return DaySlots::empty(schedule.days);
    };

    let days = (0..schedule.days)
        .map(|offset| {
            let Some(date) = now.date().checked_add_days(Days::new(offset as u64)) else {
                return Vec::new();
            };

            let start_minute = if offset == 0 {
                today_start_minute(now.time(), schedule)
            } else {
                schedule.opening_minute
            };

            slots_for_day(date, start_minute, &doctor.slots_booked, schedule)
        })
        .collect();

    let slots = DaySlots::new(days);
    debug!(
        "Computed {} slots over {} days for doctor {}",
        slots.total_slots(),
        slots.len(),
        doctor.id
    );
    slots
}

fn today_start_minute(now: NaiveTime, schedule: &SlotSchedule) -> u32 {
    match schedule.start_policy {
        SlotStartPolicy::Legacy => {
            let opening_hour = schedule.opening_minute / 60;
            let hour = if now.hour() > opening_hour { now.hour() + 1 } else { opening_hour };
            let minute = if now.minute() > 30 { 30 } else { 0 };
            hour * 60 + minute
        }
        SlotStartPolicy::NextInterval => {
            let interval = schedule.interval_minutes.max(1);
            let partial = u32::from(now.second() > 0 || now.nanosecond() > 0);
            let elapsed = now.hour() * 60 + now.minute() + partial;
            (elapsed.div_ceil(interval) * interval).max(schedule.opening_minute)
        }
    }
}

fn slots_for_day(
    date: NaiveDate,
    start_minute: u32,
    booked: &SlotsBooked,
    schedule: &SlotSchedule,
) -> Vec<AvailableSlot> {
    let key = DateKey::from(date);
    let step = schedule.interval_minutes.max(1) as usize;

    (start_minute..schedule.closing_minute)
        .step_by(step)
        .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
        .map(|time| (time, format_slot_time(time)))
        .filter(|(_, label)| !booked.is_booked(&key, label))
        .map(|(time, label)| AvailableSlot {
            datetime: date.and_time(time),
            time: label,
        })
        .collect()
}
