use std::cmp::Ordering;

use crate::models::{Appointment, AppointmentQuery, SortDirection, SortKey};

/// Filtered, sorted copy of `appointments`. Unparseable dates always sort last.
pub fn apply(appointments: &[Appointment], query: &AppointmentQuery) -> Vec<Appointment> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase);

    let mut selected: Vec<Appointment> = appointments
        .iter()
        .filter(|appointment| query.status.admits(appointment.status()))
        .filter(|appointment| needle.as_deref().map_or(true, |needle| matches_search(appointment, needle)))
        .cloned()
        .collect();

    selected.sort_by(|a, b| compare(a, b, query.sort_key, query.direction));
    selected
}

fn matches_search(appointment: &Appointment, needle: &str) -> bool {
    [
        Some(appointment.doc_data.name.as_str()),
        Some(appointment.user_data.name.as_str()),
        appointment.doc_data.speciality.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &Appointment, b: &Appointment, key: SortKey, direction: SortDirection) -> Ordering {
    let directed = |ordering: Ordering| match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };

    match key {
        SortKey::Amount => directed(a.amount.total_cmp(&b.amount)),
        SortKey::Date => match (a.scheduled_at(), b.scheduled_at()) {
            (Some(a), Some(b)) => directed(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}
