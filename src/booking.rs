//! Reservations against capacity-limited class sessions.
//!
//! Every operation locks the store from its first read to its last write, so
//! the capacity check and the insert, or a cancellation and the promotion it
//! triggers, commit as one unit. All validation runs before the first write.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::{
    Booking, BookingStatus, Cancellation, ClassSchedule, Client, NewClass, NewClient,
    ScheduledBooking, SessionSummary,
};
use crate::store::{BookingStore, InMemoryStore};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Class {0} not found")]
    CapacityComputation(Uuid),
    #[error("Class {0} is not active")]
    ClassInactive(Uuid),
    #[error("Client {0} not found")]
    ClientNotFound(Uuid),
    #[error("Booking {0} not found")]
    BookingNotFound(Uuid),
    #[error("Class does not run on {0}")]
    DateMismatch(NaiveDate),
    #[error("Client already has a booking for this class on {0}")]
    Duplicate(NaiveDate),
    #[error("Bookings must be cancelled at least {hours_required} hours before the class starts")]
    CancellationWindow { hours_required: u32 },
    #[error("Cannot change booking status from {from} to {to}")]
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Booking {0} is on the waiting list")]
    OnWaitingList(Uuid),
}

pub struct BookingManager<S = InMemoryStore> {
    store: Mutex<S>,
    clock: Arc<dyn Clock>,
}

impl<S: BookingStore> BookingManager<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
        }
    }

    pub async fn create_class(&self, new: NewClass) -> ClassSchedule {
        let class = ClassSchedule {
            id: Uuid::new_v4(),
            name: new.name,
            instructor: new.instructor,
            day_of_week: new.day_of_week,
            start_time: new.start_time,
            end_time: new.end_time,
            max_capacity: new.max_capacity,
            cancel_hours_before: new.cancel_hours_before,
            is_active: true,
        };
        self.store.lock().await.insert_class(class.clone());
        info!(class_id = %class.id, name = %class.name, "class created");
        class
    }

    pub async fn classes(&self) -> Vec<ClassSchedule> {
        self.store.lock().await.classes()
    }

    pub async fn create_client(&self, new: NewClient) -> Client {
        let client = Client {
            id: Uuid::new_v4(),
            name: new.name,
            has_active_membership: new.has_active_membership,
            classes_used: 0,
        };
        self.store.lock().await.save_client(client.clone());
        info!(client_id = %client.id, "client created");
        client
    }

    pub async fn client(&self, id: Uuid) -> Result<Client, BookingError> {
        self.store
            .lock()
            .await
            .client(id)
            .ok_or(BookingError::ClientNotFound(id))
    }

    pub async fn booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.store
            .lock()
            .await
            .booking(id)
            .ok_or(BookingError::BookingNotFound(id))
    }

    pub async fn client_bookings(&self, client_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        let store = self.store.lock().await;
        if store.client(client_id).is_none() {
            return Err(BookingError::ClientNotFound(client_id));
        }
        Ok(store.client_bookings(client_id))
    }

    /// Non-cancelled bookings of a client joined with their class, ordered by
    /// session start.
    pub async fn client_agenda(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<ScheduledBooking>, BookingError> {
        let store = self.store.lock().await;
        if store.client(client_id).is_none() {
            return Err(BookingError::ClientNotFound(client_id));
        }
        let mut agenda: Vec<ScheduledBooking> = store
            .client_bookings(client_id)
            .into_iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .filter_map(|booking| {
                let class = store.class(booking.class_id)?;
                Some(ScheduledBooking { booking, class })
            })
            .collect();
        agenda.sort_by_key(|entry| entry.starts_at());
        Ok(agenda)
    }

    pub async fn session(
        &self,
        class_id: Uuid,
        date: NaiveDate,
    ) -> Result<SessionSummary, BookingError> {
        let store = self.store.lock().await;
        let class = store
            .class(class_id)
            .ok_or(BookingError::CapacityComputation(class_id))?;
        if !class.runs_on(date) {
            return Err(BookingError::DateMismatch(date));
        }
        let session = store.session_bookings(class_id, date);
        let active = active_count(&session);
        let waiting = session.iter().filter(|b| b.is_waiting()).count() as u32;
        Ok(SessionSummary {
            class_id,
            class_name: class.name.clone(),
            date,
            starts_at: class.occurrence(date).starts_at(),
            capacity: class.max_capacity,
            active,
            waiting,
            available: class.max_capacity.saturating_sub(active),
        })
    }

    /// All bookings of a session: seated first, then the waiting list by
    /// position, then closed bookings.
    pub async fn roster(&self, class_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>, BookingError> {
        let store = self.store.lock().await;
        let class = store
            .class(class_id)
            .ok_or(BookingError::CapacityComputation(class_id))?;
        if !class.runs_on(date) {
            return Err(BookingError::DateMismatch(date));
        }
        let mut session = store.session_bookings(class_id, date);
        session.sort_by_key(|b| {
            let rank = if b.is_active() {
                0
            } else if b.is_waiting() {
                1
            } else {
                2
            };
            (rank, b.waiting_position, b.reserved_at)
        });
        Ok(session)
    }

    pub async fn reserve(
        &self,
        client_id: Uuid,
        class_id: Uuid,
        date: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let mut store = self.store.lock().await;

        let class = store
            .class(class_id)
            .ok_or(BookingError::CapacityComputation(class_id))?;
        if !class.is_active {
            return Err(BookingError::ClassInactive(class_id));
        }
        if !class.runs_on(date) {
            return Err(BookingError::DateMismatch(date));
        }
        if store.client(client_id).is_none() {
            return Err(BookingError::ClientNotFound(client_id));
        }

        let session = store.session_bookings(class_id, date);
        if session
            .iter()
            .any(|b| b.client_id == client_id && b.status != BookingStatus::Cancelled)
        {
            return Err(BookingError::Duplicate(date));
        }

        let active = active_count(&session);
        let waiting = session.iter().filter(|b| b.is_waiting()).count() as u32;
        let seated = active < class.max_capacity;

        let booking = Booking {
            id: Uuid::new_v4(),
            client_id,
            class_id,
            date,
            status: BookingStatus::Reserved,
            is_waiting_list: !seated,
            waiting_position: (!seated).then_some(waiting + 1),
            reserved_at: self.clock.now(),
            cancelled_at: None,
            cancellation_reason: None,
        };
        store.save_booking(booking.clone());

        info!(
            booking_id = %booking.id,
            %client_id,
            %class_id,
            %date,
            waiting_position = ?booking.waiting_position,
            "booking reserved"
        );
        Ok(booking)
    }

    pub async fn cancel(
        &self,
        booking_id: Uuid,
        reason: Option<String>,
    ) -> Result<Cancellation, BookingError> {
        let mut store = self.store.lock().await;

        let mut booking = store
            .booking(booking_id)
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        ensure_transition(&booking, BookingStatus::Cancelled)?;
        let class = store
            .class(booking.class_id)
            .ok_or(BookingError::CapacityComputation(booking.class_id))?;

        let now = self.clock.now();
        if !booking.is_waiting_list {
            let notice = class.occurrence(booking.date).starts_at() - now;
            if notice < Duration::hours(class.cancel_hours_before.into()) {
                return Err(BookingError::CancellationWindow {
                    hours_required: class.cancel_hours_before,
                });
            }
        }

        let was_active = booking.is_active();
        booking.status = BookingStatus::Cancelled;
        booking.cancelled_at = Some(now);
        booking.cancellation_reason = reason;
        booking.waiting_position = None;
        store.save_booking(booking.clone());

        let promoted = if was_active {
            promote_next(&mut *store, &class, booking.date)
        } else {
            None
        };
        renumber_waiting_list(&mut *store, class.id, booking.date);

        info!(
            %booking_id,
            promoted = ?promoted.as_ref().map(|b| b.id),
            "booking cancelled"
        );
        Ok(Cancellation {
            cancelled: booking,
            promoted,
        })
    }

    pub async fn confirm(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let mut store = self.store.lock().await;
        let mut booking = store
            .booking(booking_id)
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        ensure_transition(&booking, BookingStatus::Confirmed)?;
        if booking.is_waiting_list {
            return Err(BookingError::OnWaitingList(booking_id));
        }
        booking.status = BookingStatus::Confirmed;
        store.save_booking(booking.clone());
        info!(%booking_id, "booking confirmed");
        Ok(booking)
    }

    /// Marks the booking attended and counts the class against the client's
    /// active membership, if there is one.
    pub async fn mark_attended(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let mut store = self.store.lock().await;
        let booking = close_booking(&mut *store, booking_id, BookingStatus::Attended)?;

        if let Some(mut client) = store.client(booking.client_id)
            && client.has_active_membership
        {
            client.classes_used += 1;
            debug!(client_id = %client.id, classes_used = client.classes_used, "membership usage recorded");
            store.save_client(client);
        }

        info!(%booking_id, "booking attended");
        Ok(booking)
    }

    pub async fn mark_no_show(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let mut store = self.store.lock().await;
        let booking = close_booking(&mut *store, booking_id, BookingStatus::NoShow)?;
        info!(%booking_id, "booking marked no-show");
        Ok(booking)
    }
}

fn ensure_transition(booking: &Booking, next: BookingStatus) -> Result<(), BookingError> {
    if booking.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(BookingError::InvalidStateTransition {
            from: booking.status,
            to: next,
        })
    }
}

fn active_count(session: &[Booking]) -> u32 {
    session.iter().filter(|b| b.is_active()).count() as u32
}

/// Open waiting-list entries by reservation time. The sort is stable, so
/// entries reserved at the same instant keep insertion order.
fn waiting_queue(session: Vec<Booking>) -> Vec<Booking> {
    let mut queue: Vec<Booking> = session.into_iter().filter(|b| b.is_waiting()).collect();
    queue.sort_by_key(|b| b.reserved_at);
    queue
}

fn promote_next<S: BookingStore + ?Sized>(
    store: &mut S,
    class: &ClassSchedule,
    date: NaiveDate,
) -> Option<Booking> {
    let session = store.session_bookings(class.id, date);
    if active_count(&session) >= class.max_capacity {
        return None;
    }
    let mut next = waiting_queue(session).into_iter().next()?;
    next.is_waiting_list = false;
    next.waiting_position = None;
    store.save_booking(next.clone());
    info!(booking_id = %next.id, client_id = %next.client_id, "promoted from waiting list");
    Some(next)
}

fn renumber_waiting_list<S: BookingStore + ?Sized>(store: &mut S, class_id: Uuid, date: NaiveDate) {
    let queue = waiting_queue(store.session_bookings(class_id, date));
    for (position, mut booking) in (1..).zip(queue) {
        if booking.waiting_position != Some(position) {
            booking.waiting_position = Some(position);
            store.save_booking(booking);
        }
    }
}

/// Moves an open booking to a terminal status. Attendance requires a seat; a
/// seat freed by a no-show goes to the head of the waiting list.
fn close_booking<S: BookingStore + ?Sized>(
    store: &mut S,
    booking_id: Uuid,
    status: BookingStatus,
) -> Result<Booking, BookingError> {
    let mut booking = store
        .booking(booking_id)
        .ok_or(BookingError::BookingNotFound(booking_id))?;
    ensure_transition(&booking, status)?;
    if status == BookingStatus::Attended && booking.is_waiting_list {
        return Err(BookingError::OnWaitingList(booking_id));
    }
    let class = store
        .class(booking.class_id)
        .ok_or(BookingError::CapacityComputation(booking.class_id))?;

    let was_active = booking.is_active();
    booking.status = status;
    if booking.is_waiting_list {
        booking.waiting_position = None;
    }
    store.save_booking(booking.clone());

    if was_active && !booking.is_active() {
        promote_next(store, &class, booking.date);
    }
    renumber_waiting_list(store, class.id, booking.date);
    Ok(booking)
}
