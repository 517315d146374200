//! Shared in-memory store backing the repository implementations.
//!
//! Every table is a plain map keyed by a monotonic `i64` counter, all behind
//! a single `RwLock`. Mutations take the write guard for their whole
//! read-check-write sequence, which is what gives `update_status` its
//! compare-and-set behavior.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use crate::domains::bookings::BookingStatus;
use crate::domains::items::Item;
use crate::domains::users::User;

#[derive(Debug, Clone)]
pub(crate) struct BookingRecord {
    pub id: i64,
    pub item_id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentRecord {
    pub id: i64,
    pub item_id: i64,
    pub author_id: i64,
    /// Snapshotted at creation time; a later author rename does not rewrite
    /// existing comments.
    pub author_name: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct RequestRecord {
    pub id: i64,
    pub requestor_id: i64,
    pub description: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    pub users: BTreeMap<i64, User>,
    pub items: BTreeMap<i64, Item>,
    pub bookings: BTreeMap<i64, BookingRecord>,
    pub comments: BTreeMap<i64, CommentRecord>,
    pub requests: BTreeMap<i64, RequestRecord>,
    next_user_id: i64,
    next_item_id: i64,
    next_booking_id: i64,
    next_comment_id: i64,
    next_request_id: i64,
}

impl StoreInner {
    pub fn next_user_id(&mut self) -> i64 {
        self.next_user_id += 1;
        self.next_user_id
    }

    pub fn next_item_id(&mut self) -> i64 {
        self.next_item_id += 1;
        self.next_item_id
    }

    pub fn next_booking_id(&mut self) -> i64 {
        self.next_booking_id += 1;
        self.next_booking_id
    }

    pub fn next_comment_id(&mut self) -> i64 {
        self.next_comment_id += 1;
        self.next_comment_id
    }

    pub fn next_request_id(&mut self) -> i64 {
        self.next_request_id += 1;
        self.next_request_id
    }
}

/// Cloneable handle to the shared store, injected into every repository.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>, anyhow::Error> {
        self.inner.read().map_err(|_| anyhow!("store lock poisoned"))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>, anyhow::Error> {
        self.inner
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))
    }
}
