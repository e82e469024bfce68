//! Persistence seam for the booking core.
//!
//! The manager holds a store behind a lock for the whole of each operation,
//! so implementations only need plain reads and writes.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Booking, ClassSchedule, Client};

pub trait BookingStore: Send {
    fn class(&self, id: Uuid) -> Option<ClassSchedule>;
    fn classes(&self) -> Vec<ClassSchedule>;
    fn insert_class(&mut self, class: ClassSchedule);

    fn client(&self, id: Uuid) -> Option<Client>;
    fn save_client(&mut self, client: Client);

    fn booking(&self, id: Uuid) -> Option<Booking>;
    /// Bookings of one session, in insertion order.
    fn session_bookings(&self, class_id: Uuid, date: NaiveDate) -> Vec<Booking>;
    /// Bookings of one client, in insertion order.
    fn client_bookings(&self, client_id: Uuid) -> Vec<Booking>;
    /// Inserts a new booking or replaces the one with the same id.
    fn save_booking(&mut self, booking: Booking);
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    classes: Vec<ClassSchedule>,
    clients: HashMap<Uuid, Client>,
    bookings: Vec<Booking>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookingStore for InMemoryStore {
    fn class(&self, id: Uuid) -> Option<ClassSchedule> {
        self.classes.iter().find(|c| c.id == id).cloned()
    }

    fn classes(&self) -> Vec<ClassSchedule> {
        self.classes.clone()
    }

    fn insert_class(&mut self, class: ClassSchedule) {
        self.classes.push(class);
    }

    fn client(&self, id: Uuid) -> Option<Client> {
        self.clients.get(&id).cloned()
    }

    fn save_client(&mut self, client: Client) {
        self.clients.insert(client.id, client);
    }

    fn booking(&self, id: Uuid) -> Option<Booking> {
        self.bookings.iter().find(|b| b.id == id).cloned()
    }

    fn session_bookings(&self, class_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.class_id == class_id && b.date == date)
            .cloned()
            .collect()
    }

    fn client_bookings(&self, client_id: Uuid) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.client_id == client_id)
            .cloned()
            .collect()
    }

    fn save_booking(&mut self, booking: Booking) {
        match self.bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => self.bookings.push(booking),
        }
    }
}
