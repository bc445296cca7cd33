use tracing::debug;

use doctor_cell::models::DaySlots;

use crate::models::{AppointmentError, BookAppointmentRequest};

/// Day and time picked on the booking page, checked against the offered slots.
#[derive(Debug, Clone, Default)]
pub struct BookingSession {
    slots: DaySlots,
    selected_day: Option<usize>,
    selected_time: Option<String>,
}

impl BookingSession {
    pub fn new(slots: DaySlots) -> Self {
        Self {
            slots,
            selected_day: None,
            selected_time: None,
        }
    }

    pub fn slots(&self) -> &DaySlots {
        &self.slots
    }

    pub fn selected_day(&self) -> Option<usize> {
        self.selected_day
    }

    pub fn selected_time(&self) -> Option<&str> {
        self.selected_time.as_deref()
    }

    /// Picking a day always clears the picked time, even for the same day.
    pub fn select_day(&mut self, day_index: usize) -> Result<(), AppointmentError> {
        if day_index >= self.slots.len() {
            return Err(AppointmentError::DayOutOfRange(day_index));
        }

        self.selected_day = Some(day_index);
        self.selected_time = None;
        Ok(())
    }

    pub fn select_time(&mut self, time: &str) -> Result<(), AppointmentError> {
        let day_index = self.selected_day.ok_or(AppointmentError::SelectionIncomplete)?;

        if !self.slots.offers(day_index, time) {
            return Err(AppointmentError::TimeNotOffered {
                time: time.to_string(),
            });
        }

        self.selected_time = Some(time.to_string());
        Ok(())
    }

    pub fn can_book(&self) -> bool {
        self.selected_day.is_some() && self.selected_time.is_some()
    }

    /// Swaps in freshly computed slots, dropping picks they no longer offer.
    pub fn reconcile(&mut self, slots: DaySlots) {
        self.slots = slots;

        if self.selected_day.is_some_and(|day| day >= self.slots.len()) {
            debug!("Selected day no longer offered, clearing selection");
            self.selected_day = None;
            self.selected_time = None;
            return;
        }

        if let (Some(day), Some(time)) = (self.selected_day, self.selected_time.as_deref()) {
            if !self.slots.offers(day, time) {
                debug!("Selected time {} no longer offered, clearing it", time);
                self.selected_time = None;
            }
        }
    }

    /// Request for the backend. The date key comes from the chosen day's first slot.
    pub fn booking_request(&self, doc_id: &str) -> Result<BookAppointmentRequest, AppointmentError> {
        let (Some(day_index), Some(time)) = (self.selected_day, self.selected_time.as_ref()) else {
            return Err(AppointmentError::SelectionIncomplete);
        };

        let slot_date = self
            .slots
            .date_key_for(day_index)
            .ok_or(AppointmentError::NoSlotsOnDay)?;

        Ok(BookAppointmentRequest {
            doc_id: doc_id.to_string(),
            slot_date,
            slot_time: time.clone(),
        })
    }
}
