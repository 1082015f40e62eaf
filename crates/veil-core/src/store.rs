//! Cache-and-refetch primitive for one piece of server-held state.
//!
//! A [`StateStore`] owns its cached value: it is the only writer, at most one
//! fetch is in flight at a time, and a `reload()` issued while a fetch is
//! outstanding shares that fetch instead of starting another one. Failed
//! fetches keep the previous value and publish nothing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::service::ServiceResult;
use crate::signal::{Listeners, Subscription};
use crate::util::{lock, unix_timestamp_now};

/// Where a store gets its value from.
#[async_trait]
pub trait StateSource<T>: Send + Sync {
    async fn fetch(&self) -> ServiceResult<T>;
}

/// Ticket identifying one fetch. Coalesced reloads share a ticket.
pub type FetchTicket = u64;

pub struct StateStore<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for StateStore<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T> {
    name: String,
    source: Arc<dyn StateSource<T>>,
    slot: Mutex<Slot<T>>,
    settled: watch::Sender<Settled>,
}

struct Slot<T> {
    value: Option<T>,
    fetched_at: Option<i64>,
    in_flight: Option<FetchTicket>,
    issued: FetchTicket,
    listeners: Listeners<T>,
}

/// Last completed fetch.
#[derive(Debug, Clone, Default)]
struct Settled {
    ticket: FetchTicket,
    error: Option<String>,
}

impl<T> StateStore<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, source: Arc<dyn StateSource<T>>) -> Self {
        let (settled, _) = watch::channel(Settled::default());
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                source,
                slot: Mutex::new(Slot {
                    value: None,
                    fetched_at: None,
                    in_flight: None,
                    issued: 0,
                    listeners: Listeners::default(),
                }),
                settled,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Cached value; `None` until the first successful fetch.
    pub fn get_current(&self) -> Option<T> {
        lock(&self.shared.slot).value.clone()
    }

    /// Unix time of the last successful fetch.
    pub fn fetched_at(&self) -> Option<i64> {
        lock(&self.shared.slot).fetched_at
    }

    pub fn is_fetching(&self) -> bool {
        lock(&self.shared.slot).in_flight.is_some()
    }

    /// Start a background refetch, or join the one already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn reload(&self) -> FetchTicket {
        let ticket = {
            let mut slot = lock(&self.shared.slot);
            if let Some(ticket) = slot.in_flight {
                tracing::debug!(
                    store = %self.shared.name,
                    ticket,
                    "Reload coalesced into in-flight fetch"
                );
                return ticket;
            }
            slot.issued += 1;
            slot.in_flight = Some(slot.issued);
            slot.issued
        };

        tracing::debug!(store = %self.shared.name, ticket, "Fetching state");
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = shared.source.fetch().await;
            shared.complete(ticket, result);
        });
        ticket
    }

    /// Reload and wait for the outcome.
    ///
    /// Unlike [`Self::reload`], a failed fetch is reported to the caller. The
    /// cached value is still left untouched.
    pub async fn refresh(&self) -> Result<T, StoreError> {
        let ticket = self.reload();
        self.wait_for(ticket).await
    }

    /// Wait for the most recently issued fetch without starting a new one.
    ///
    /// Returns the error of that fetch when it failed, and
    /// [`StoreError::NotLoaded`] when nothing was ever fetched.
    pub async fn settled(&self) -> Result<T, StoreError> {
        let issued = lock(&self.shared.slot).issued;
        if issued == 0 {
            return Err(StoreError::NotLoaded);
        }
        self.wait_for(issued).await
    }

    /// Wait until fetch `ticket` has completed.
    ///
    /// Fetches complete in issue order, so any later ticket also settles it.
    pub async fn wait_for(&self, ticket: FetchTicket) -> Result<T, StoreError> {
        let mut settled = self.shared.settled.subscribe();
        loop {
            {
                let last = settled.borrow_and_update();
                if last.ticket >= ticket {
                    if let Some(error) = &last.error {
                        return Err(StoreError::FetchFailed(error.clone()));
                    }
                    break;
                }
            }
            if settled.changed().await.is_err() {
                break;
            }
        }
        self.get_current().ok_or(StoreError::NotLoaded)
    }

    /// Subscribe to value changes, replaying the current value if there is one.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut slot = lock(&self.shared.slot);
        let current = slot.value.clone();
        slot.listeners.subscribe(current)
    }

    /// Apply a local edit to the cached value and publish it if it changed.
    ///
    /// Does nothing before the first successful fetch.
    pub(crate) fn amend(&self, edit: impl FnOnce(&mut T)) -> bool {
        let mut slot = lock(&self.shared.slot);
        let Slot {
            value, listeners, ..
        } = &mut *slot;
        let Some(current) = value.as_mut() else {
            return false;
        };
        let before = current.clone();
        edit(current);
        if *current == before {
            return false;
        }
        listeners.publish(current);
        true
    }
}

impl<T> Shared<T>
where
    T: Clone + PartialEq,
{
    fn complete(&self, ticket: FetchTicket, result: ServiceResult<T>) {
        let error = {
            let mut slot = lock(&self.slot);
            if slot.in_flight == Some(ticket) {
                slot.in_flight = None;
            }
            match result {
                Ok(value) => {
                    slot.fetched_at = Some(unix_timestamp_now());
                    if slot.value.as_ref() == Some(&value) {
                        tracing::debug!(store = %self.name, ticket, "Fetched state unchanged");
                    } else {
                        slot.listeners.publish(&value);
                        slot.value = Some(value);
                    }
                    None
                }
                Err(error) => {
                    tracing::warn!(
                        store = %self.name,
                        ticket,
                        "Fetch failed, keeping cached state: {}",
                        error
                    );
                    Some(error.to_string())
                }
            }
        };
        self.settled.send_replace(Settled { ticket, error });
    }
}
