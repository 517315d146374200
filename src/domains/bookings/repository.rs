use anyhow::anyhow;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{Booking, BookingRef, BookingStatus};
use crate::pagination::{Page, paged};
use crate::store::{BookingRecord, InMemoryStore, StoreInner};

#[derive(Debug, Error)]
pub enum UpdateStatusError {
    #[error("booking not found")]
    NotFound,
    #[error("the booking has already been approved")]
    AlreadyApproved,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

/// Defines the BookingsRepository trait for booking storage operations.
///
/// The listing queries come pre-classified: one ALL query per viewpoint
/// (optionally paged) and four fixed-state queries (CURRENT, PAST, FUTURE,
/// by-status), mirroring how the service dispatches on [super::BookingState].
/// Temporal queries take `now` explicitly so classification is testable.
#[async_trait::async_trait]
pub trait BookingsRepository: Send + Sync + 'static {
    /// Persists a new booking in WAITING status and returns its view.
    async fn create(
        &self,
        item_id: i64,
        booker_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, anyhow::Error>;

    /// Retrieves a [Booking] by id, `None` if absent.
    async fn find_by_id(&self, booking_id: i64) -> Result<Option<Booking>, anyhow::Error>;

    /// Atomically moves a booking to `status`, checking and writing under a
    /// single write guard so two concurrent approvals cannot both succeed.
    ///
    /// # Errors
    /// - MUST return [UpdateStatusError::NotFound] if the booking does not
    ///   exist.
    /// - MUST return [UpdateStatusError::AlreadyApproved] if the booking is
    ///   already APPROVED.
    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<Booking, UpdateStatusError>;

    /// Every booking created by `booker_id`, start descending.
    async fn find_by_booker(
        &self,
        booker_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Bookings by `booker_id` with `start <= now <= end`, start ascending.
    async fn find_current_by_booker(
        &self,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Bookings by `booker_id` with `end < now`, start descending.
    async fn find_past_by_booker(
        &self,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Bookings by `booker_id` with `start > now`, start descending.
    async fn find_future_by_booker(
        &self,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Bookings by `booker_id` with the given status, start descending.
    async fn find_by_booker_and_status(
        &self,
        booker_id: i64,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Every booking on items owned by `owner_id`, start descending.
    async fn find_by_owner(
        &self,
        owner_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Owner-view counterpart of [Self::find_current_by_booker].
    async fn find_current_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Owner-view counterpart of [Self::find_past_by_booker].
    async fn find_past_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Owner-view counterpart of [Self::find_future_by_booker].
    async fn find_future_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Owner-view counterpart of [Self::find_by_booker_and_status].
    async fn find_by_owner_and_status(
        &self,
        owner_id: i64,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, anyhow::Error>;

    /// Most recent APPROVED booking on the item with `start < now`.
    async fn find_last_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<BookingRef>, anyhow::Error>;

    /// Soonest APPROVED booking on the item with `start > now`.
    async fn find_next_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<BookingRef>, anyhow::Error>;
}

#[derive(Clone)]
pub struct InMemoryBookingsRepository {
    store: InMemoryStore,
}

impl InMemoryBookingsRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

/// Resolves a record into a view with item and booker snapshots.
fn hydrate(store: &StoreInner, record: &BookingRecord) -> Result<Booking, anyhow::Error> {
    let item = store
        .items
        .get(&record.item_id)
        .cloned()
        .ok_or_else(|| anyhow!("booking {} references a missing item", record.id))?;
    let booker = store
        .users
        .get(&record.booker_id)
        .cloned()
        .ok_or_else(|| anyhow!("booking {} references a missing booker", record.id))?;
    Ok(Booking {
        id: record.id,
        start: record.start,
        end: record.end,
        status: record.status,
        item,
        booker,
    })
}

/// Hydrates the records selected by `select`, sorted by start time.
fn collect_sorted(
    store: &StoreInner,
    select: impl Fn(&BookingRecord) -> bool,
    ascending: bool,
) -> Result<Vec<Booking>, anyhow::Error> {
    let mut records: Vec<&BookingRecord> =
        store.bookings.values().filter(|r| select(r)).collect();
    if ascending {
        records.sort_by_key(|r| r.start);
    } else {
        records.sort_by_key(|r| std::cmp::Reverse(r.start));
    }
    records.into_iter().map(|r| hydrate(store, r)).collect()
}

fn owns(store: &StoreInner, owner_id: i64, item_id: i64) -> bool {
    store
        .items
        .get(&item_id)
        .is_some_and(|item| item.owner_id == owner_id)
}

#[async_trait::async_trait]
impl BookingsRepository for InMemoryBookingsRepository {
    async fn create(
        &self,
        item_id: i64,
        booker_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, anyhow::Error> {
        let mut store = self.store.write()?;
        let record = BookingRecord {
            id: store.next_booking_id(),
            item_id,
            booker_id,
            start,
            end,
            status: BookingStatus::Waiting,
        };
        let booking = hydrate(&store, &record)?;
        store.bookings.insert(record.id, record);
        Ok(booking)
    }

    async fn find_by_id(&self, booking_id: i64) -> Result<Option<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        match store.bookings.get(&booking_id) {
            Some(record) => Ok(Some(hydrate(&store, record)?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<Booking, UpdateStatusError> {
        let mut store = self.store.write()?;
        let record = store
            .bookings
            .get_mut(&booking_id)
            .ok_or(UpdateStatusError::NotFound)?;
        if record.status == BookingStatus::Approved {
            return Err(UpdateStatusError::AlreadyApproved);
        }
        record.status = status;
        let record = record.clone();
        Ok(hydrate(&store, &record)?)
    }

    async fn find_by_booker(
        &self,
        booker_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        let bookings = collect_sorted(&store, |r| r.booker_id == booker_id, false)?;
        Ok(paged(bookings, page))
    }

    async fn find_current_by_booker(
        &self,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(
            &store,
            |r| r.booker_id == booker_id && r.start <= now && now <= r.end,
            true,
        )
    }

    async fn find_past_by_booker(
        &self,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(&store, |r| r.booker_id == booker_id && r.end < now, false)
    }

    async fn find_future_by_booker(
        &self,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(&store, |r| r.booker_id == booker_id && r.start > now, false)
    }

    async fn find_by_booker_and_status(
        &self,
        booker_id: i64,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(
            &store,
            |r| r.booker_id == booker_id && r.status == status,
            false,
        )
    }

    async fn find_by_owner(
        &self,
        owner_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        let bookings = collect_sorted(&store, |r| owns(&store, owner_id, r.item_id), false)?;
        Ok(paged(bookings, page))
    }

    async fn find_current_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(
            &store,
            |r| owns(&store, owner_id, r.item_id) && r.start <= now && now <= r.end,
            true,
        )
    }

    async fn find_past_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(
            &store,
            |r| owns(&store, owner_id, r.item_id) && r.end < now,
            false,
        )
    }

    async fn find_future_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(
            &store,
            |r| owns(&store, owner_id, r.item_id) && r.start > now,
            false,
        )
    }

    async fn find_by_owner_and_status(
        &self,
        owner_id: i64,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, anyhow::Error> {
        let store = self.store.read()?;
        collect_sorted(
            &store,
            |r| owns(&store, owner_id, r.item_id) && r.status == status,
            false,
        )
    }

    async fn find_last_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<BookingRef>, anyhow::Error> {
        let store = self.store.read()?;
        Ok(store
            .bookings
            .values()
            .filter(|r| {
                r.item_id == item_id && r.status == BookingStatus::Approved && r.start < now
            })
            .max_by_key(|r| r.start)
            .map(|r| BookingRef {
                id: r.id,
                booker_id: r.booker_id,
            }))
    }

    async fn find_next_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<BookingRef>, anyhow::Error> {
        let store = self.store.read()?;
        Ok(store
            .bookings
            .values()
            .filter(|r| {
                r.item_id == item_id && r.status == BookingStatus::Approved && r.start > now
            })
            .min_by_key(|r| r.start)
            .map(|r| BookingRef {
                id: r.id,
                booker_id: r.booker_id,
            }))
    }
}
