//! Application state shared by the handlers.
//!
//! Everything the pages used to keep in ambient context lives here and is
//! passed explicitly: persisted drafts, live checkout sessions, the local
//! order book and the coupon and booking collaborators.

use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::error::CheckoutError;
use crate::models::booking::BookingDraft;
use crate::models::order::Order;
use crate::services::booking::interface::BookingOperations;
use crate::services::catalog_service::CatalogService;
use crate::services::checkout_service::CheckoutSession;
use crate::services::coupon_service::CouponLookup;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct StoredDraft {
    payload: String,
    expires_at: Instant,
}

/// Short-lived key-value store for serialized drafts, so a checkout
/// survives a reload until the booking goes through.
pub struct DraftStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, StoredDraft>>,
}

impl DraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stores the draft and returns when it expires. Expired entries are
    /// swept on every save.
    pub fn save(&self, key: &str, draft: &BookingDraft) -> Result<Instant, CheckoutError> {
        let payload =
            serde_json::to_string(draft).map_err(|e| CheckoutError::Storage(e.to_string()))?;
        let now = Instant::now();
        let expires_at = now + self.ttl;

        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, stored| now < stored.expires_at);
        if entries.len() < before {
            debug!("Swept {} expired drafts", before - entries.len());
        }
        entries.insert(
            key.to_string(),
            StoredDraft {
                payload,
                expires_at,
            },
        );
        Ok(expires_at)
    }

    /// The draft with its expiry. Expired entries are dropped on read.
    pub fn load_entry(&self, key: &str) -> Result<Option<(BookingDraft, Instant)>, CheckoutError> {
        let mut entries = lock(&self.entries);
        let expires_at = match entries.get(key) {
            Some(stored) => stored.expires_at,
            None => return Ok(None),
        };
        if Instant::now() >= expires_at {
            debug!("Draft {} expired", key);
            entries.remove(key);
            return Ok(None);
        }
        match entries.get(key) {
            Some(stored) => serde_json::from_str(&stored.payload)
                .map(|draft| Some((draft, expires_at)))
                .map_err(|e| CheckoutError::Storage(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn load(&self, key: &str) -> Result<Option<BookingDraft>, CheckoutError> {
        Ok(self.load_entry(key)?.map(|(draft, _)| draft))
    }

    pub fn remove(&self, key: &str) -> bool {
        lock(&self.entries).remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.load(key), Ok(Some(_)))
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct LiveSession {
    session: CheckoutSession,
    expires_at: Instant,
}

impl LiveSession {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Live checkout page state, keyed by checkout id. A session ends when the
/// draft it was opened from expires.
#[derive(Default)]
pub struct CheckoutSessions {
    sessions: Mutex<HashMap<String, LiveSession>>,
}

// Drops `key` if it has expired and returns what is left of it
fn live_entry<'a>(
    sessions: &'a mut HashMap<String, LiveSession>,
    key: &str,
) -> Option<&'a mut LiveSession> {
    let now = Instant::now();
    if sessions.get(key).is_some_and(|s| !s.is_live(now)) {
        debug!("Checkout session {} expired", key);
        sessions.remove(key);
    }
    sessions.get_mut(key)
}

fn sweep(sessions: &mut HashMap<String, LiveSession>) {
    let now = Instant::now();
    let before = sessions.len();
    sessions.retain(|_, s| s.is_live(now));
    if sessions.len() < before {
        debug!("Swept {} expired checkout sessions", before - sessions.len());
    }
}

impl CheckoutSessions {
    /// Opens a session, replacing any existing one for `key`.
    pub fn open(&self, key: &str, session: CheckoutSession, expires_at: Instant) {
        let mut sessions = lock(&self.sessions);
        sweep(&mut sessions);
        sessions.insert(
            key.to_string(),
            LiveSession {
                session,
                expires_at,
            },
        );
    }

    /// Opens a session only if no live one exists, and returns whichever
    /// session is live afterwards.
    pub fn open_if_absent(
        &self,
        key: &str,
        session: impl FnOnce() -> CheckoutSession,
        expires_at: Instant,
    ) -> CheckoutSession {
        let mut sessions = lock(&self.sessions);
        sweep(&mut sessions);
        sessions
            .entry(key.to_string())
            .or_insert_with(|| LiveSession {
                session: session(),
                expires_at,
            })
            .session
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<CheckoutSession> {
        live_entry(&mut lock(&self.sessions), key).map(|s| s.session.clone())
    }

    /// Runs `f` against the live session, if there is one.
    pub fn update<R>(&self, key: &str, f: impl FnOnce(&mut CheckoutSession) -> R) -> Option<R> {
        live_entry(&mut lock(&self.sessions), key).map(|s| f(&mut s.session))
    }

    pub fn remove(&self, key: &str) -> Option<CheckoutSession> {
        lock(&self.sessions).remove(key).map(|s| s.session)
    }

    /// Raises the in-flight flag and hands back a snapshot to submit.
    pub fn begin_submission(&self, key: &str) -> Result<CheckoutSession, CheckoutError> {
        let mut sessions = lock(&self.sessions);
        let live = live_entry(&mut sessions, key).ok_or(CheckoutError::MissingDraft)?;
        if live.session.in_flight {
            return Err(CheckoutError::SubmissionInProgress);
        }
        live.session.in_flight = true;
        Ok(live.session.clone())
    }

    pub fn finish_submission(&self, key: &str) {
        if let Some(live) = lock(&self.sessions).get_mut(key) {
            live.session.in_flight = false;
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Orders placed from this client, in the order they were booked.
#[derive(Default)]
pub struct OrderBook {
    orders: RwLock<Vec<Order>>,
}

impl OrderBook {
    pub fn record(&self, order: Order) {
        info!("Recorded order {} for {}", order.id, order.bike);
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order);
    }

    pub fn list(&self) -> Vec<Order> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub struct AppState {
    config: AppConfig,
    catalog: CatalogService,
    drafts: DraftStore,
    sessions: CheckoutSessions,
    orders: OrderBook,
    coupons: Arc<dyn CouponLookup>,
    bookings: Arc<dyn BookingOperations>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        coupons: Arc<dyn CouponLookup>,
        bookings: Arc<dyn BookingOperations>,
    ) -> Self {
        Self {
            drafts: DraftStore::new(config.draft_ttl),
            catalog: CatalogService::default(),
            sessions: CheckoutSessions::default(),
            orders: OrderBook::default(),
            config,
            coupons,
            bookings,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn sessions(&self) -> &CheckoutSessions {
        &self.sessions
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn coupons(&self) -> &dyn CouponLookup {
        self.coupons.as_ref()
    }

    pub fn bookings(&self) -> &dyn BookingOperations {
        self.bookings.as_ref()
    }
}
