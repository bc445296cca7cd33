use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use shared_config::{AppConfig, SlotStartPolicySetting};
use shared_models::error::AppError;

// ==============================================================================
// DOCTOR RECORD
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub address: Address,
    #[serde(default, deserialize_with = "SlotsBooked::lenient")]
    pub slots_booked: SlotsBooked,
}

impl Doctor {
    pub fn is_booked(&self, key: &DateKey, time: &str) -> bool {
        self.slots_booked.is_booked(key, time)
    }
}

/// Years of practice, normalized once from whatever shape the backend stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawExperience", tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Experience {
    Years(u32),
    Described(String),
    #[default]
    Unknown,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExperience {
    Count(f64),
    Text(String),
    Detailed {
        #[serde(default, alias = "value")]
        years: Option<f64>,
        #[serde(default)]
        description: Option<String>,
    },
    Empty(()),
}

impl From<RawExperience> for Experience {
    fn from(raw: RawExperience) -> Self {
        match raw {
            RawExperience::Count(years) if years >= 0.0 => Experience::Years(years as u32),
            RawExperience::Count(_) | RawExperience::Empty(()) => Experience::Unknown,
            RawExperience::Text(text) => Experience::from_text(&text),
            RawExperience::Detailed { years: Some(years), .. } if years >= 0.0 => {
                Experience::Years(years as u32)
            }
            RawExperience::Detailed { description: Some(text), .. } => Experience::from_text(&text),
            RawExperience::Detailed { .. } => Experience::Unknown,
        }
    }
}

impl Experience {
    /// "4 Years" and "4" become `Years(4)`; anything else is kept as written.
    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Experience::Unknown;
        }

        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let rest = trimmed[digits.len()..].trim().to_ascii_lowercase();
        match digits.parse::<u32>() {
            Ok(years) if rest.is_empty() || rest == "year" || rest == "years" => Experience::Years(years),
            _ => Experience::Described(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Experience::Years(1) => write!(f, "1 Year"),
            Experience::Years(years) => write!(f, "{} Years", years),
            Experience::Described(text) => write!(f, "{}", text),
            Experience::Unknown => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawAddress")]
pub struct Address {
    pub line1: String,
    pub line2: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Text(String),
    Lines {
        #[serde(default)]
        line1: String,
        #[serde(default)]
        line2: String,
    },
    Empty(()),
}

impl From<RawAddress> for Address {
    fn from(raw: RawAddress) -> Self {
        match raw {
            RawAddress::Text(text) => Address {
                line1: text.trim().to_string(),
                line2: String::new(),
            },
            RawAddress::Lines { line1, line2 } => Address { line1, line2 },
            RawAddress::Empty(()) => Address::default(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line1.is_empty(), self.line2.is_empty()) {
            (false, false) => write!(f, "{}, {}", self.line1, self.line2),
            (false, true) => write!(f, "{}", self.line1),
            (true, false) => write!(f, "{}", self.line2),
            (true, true) => Ok(()),
        }
    }
}

// ==============================================================================
// BOOKED SLOTS
// ==============================================================================

/// Times already taken, keyed by `D_M_YYYY` date key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotsBooked(BTreeMap<String, BTreeSet<String>>);

impl SlotsBooked {
    pub fn is_booked(&self, key: &DateKey, time: &str) -> bool {
        self.0
            .get(&key.to_string())
            .is_some_and(|times| times.contains(time))
    }

    pub fn book(&mut self, key: &DateKey, time: impl Into<String>) {
        self.0.entry(key.to_string()).or_default().insert(time.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Anything that is not a map of string arrays counts as "nothing booked".
    pub fn from_value(value: &Value) -> Self {
        let mut booked = SlotsBooked::default();

        let entries = match value {
            Value::Null => return booked,
            Value::Object(entries) => entries,
            other => {
                warn!("Ignoring malformed slots_booked value: {}", other);
                return booked;
            }
        };

        for (date_key, times) in entries {
            let Some(times) = times.as_array() else {
                warn!("Ignoring malformed slots_booked entry for {}", date_key);
                continue;
            };

            let set = booked.0.entry(date_key.clone()).or_default();
            for time in times {
                match time.as_str() {
                    Some(time) => {
                        set.insert(time.to_string());
                    }
                    None => warn!("Ignoring non-string booked time under {}: {}", date_key, time),
                }
            }
        }

        booked
    }

    fn lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

// ==============================================================================
// DATE KEY (`D_M_YYYY`, unpadded, 1-based month)
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateKey)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl From<NaiveDateTime> for DateKey {
    fn from(datetime: NaiveDateTime) -> Self {
        DateKey(datetime.date())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.0.day(), self.0.month(), self.0.year())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateKeyError {
    #[error("Date key must look like D_M_YYYY: {0}")]
    Malformed(String),

    #[error("Date key does not name a calendar date: {0}")]
    InvalidDate(String),
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('_').collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(DateKeyError::Malformed(s.to_string()));
        }

        let day: u32 = parts[0].parse().map_err(|_| DateKeyError::Malformed(s.to_string()))?;
        let month: u32 = parts[1].parse().map_err(|_| DateKeyError::Malformed(s.to_string()))?;
        let year: i32 = parts[2].parse().map_err(|_| DateKeyError::Malformed(s.to_string()))?;

        DateKey::from_ymd(year, month, day).ok_or_else(|| DateKeyError::InvalidDate(s.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// SLOTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub datetime: NaiveDateTime,
    /// Display time, `h:mm AM/PM`.
    pub time: String,
}

/// Per-day bookable slots, index 0 is today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DaySlots(Vec<Vec<AvailableSlot>>);

impl DaySlots {
    pub fn new(days: Vec<Vec<AvailableSlot>>) -> Self {
        DaySlots(days)
    }

    pub fn empty(days: usize) -> Self {
        DaySlots(vec![Vec::new(); days])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn day(&self, index: usize) -> Option<&[AvailableSlot]> {
        self.0.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[AvailableSlot]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn total_slots(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Date key of a day, taken from its first slot. Empty days have none.
    pub fn date_key_for(&self, index: usize) -> Option<DateKey> {
        self.day(index)?.first().map(|slot| DateKey::from(slot.datetime))
    }

    pub fn offers(&self, index: usize, time: &str) -> bool {
        self.day(index)
            .is_some_and(|slots| slots.iter().any(|slot| slot.time == time))
    }

    pub fn views(&self) -> Vec<DayView> {
        self.0
            .iter()
            .enumerate()
            .map(|(day_index, slots)| DayView {
                day_index,
                date_key: self.date_key_for(day_index),
                weekday: slots
                    .first()
                    .map(|slot| slot.datetime.format("%a").to_string().to_uppercase()),
                slots: slots.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub day_index: usize,
    pub date_key: Option<DateKey>,
    pub weekday: Option<String>,
    pub slots: Vec<AvailableSlot>,
}

// ==============================================================================
// SCHEDULING CONFIGURATION
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStartPolicy {
    /// hour = now.hour > opening hour ? now.hour + 1 : opening hour,
    /// minute = now.minute > 30 ? 30 : 0. Can start up to an hour before now.
    #[default]
    Legacy,
    /// First interval boundary at or after now, never before opening.
    NextInterval,
}

impl From<SlotStartPolicySetting> for SlotStartPolicy {
    fn from(setting: SlotStartPolicySetting) -> Self {
        match setting {
            SlotStartPolicySetting::Legacy => SlotStartPolicy::Legacy,
            SlotStartPolicySetting::NextInterval => SlotStartPolicy::NextInterval,
        }
    }
}

/// Clinic window in minutes after midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSchedule {
    pub opening_minute: u32,
    pub closing_minute: u32,
    pub interval_minutes: u32,
    pub days: usize,
    pub start_policy: SlotStartPolicy,
}

impl Default for SlotSchedule {
    fn default() -> Self {
        Self {
            opening_minute: 10 * 60,
            closing_minute: 21 * 60,
            interval_minutes: 30,
            days: 7,
            start_policy: SlotStartPolicy::Legacy,
        }
    }
}

impl SlotSchedule {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            start_policy: config.slot_start_policy.into(),
            ..Self::default()
        }
    }

    pub fn with_policy(start_policy: SlotStartPolicy) -> Self {
        Self {
            start_policy,
            ..Self::default()
        }
    }
}

// ==============================================================================
// REQUEST / RESPONSE SHAPES
// ==============================================================================

/// Entries stay raw so one bad record cannot sink the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListPayload {
    #[serde(default)]
    pub doctors: Vec<Value>,
}

impl DoctorListPayload {
    /// Decodes each entry on its own, skipping the ones that do not fit.
    pub fn into_doctors(self) -> Vec<Doctor> {
        self.doctors
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Doctor>(entry) {
                Ok(doctor) => Some(doctor),
                Err(e) => {
                    warn!("Skipping malformed doctor record: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListQuery {
    pub speciality: Option<String>,
}

// Error types specific to doctor operations
#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Doctor directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::DirectoryUnavailable(_) => AppError::ExternalService(err.to_string()),
        }
    }
}
