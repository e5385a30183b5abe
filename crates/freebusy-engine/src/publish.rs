//! Free/busy publishing.
//!
//! Pulls the calendar rows intersecting a window from a store, expands
//! recurring items, merges everything into busy blocks and hands the blocks to
//! a sink. Batch publishing keeps going when one user fails: a user without a
//! free/busy provider is skipped, any other failure is recorded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{FreeBusyError, Result};
use crate::expander::RecurrenceExpander;
use crate::item::CalendarItem;
use crate::merger::{self, MergedInterval};
use crate::occurrence::{Occurrence, TimeWindow};
use crate::restriction::window_restriction;
use crate::store::CalendarStore;

/// Destination for published free/busy data.
pub trait FreeBusySink {
    /// Replace the published free/busy data of `user` for `window`.
    ///
    /// # Errors
    /// `FreeBusyError::ProviderNotFound` if the user has no free/busy provider.
    fn publish(&mut self, user: &str, window: &TimeWindow, blocks: &[MergedInterval])
        -> Result<()>;
}

/// A user and the calendar folder their free/busy data is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user: String,
    pub calendar: String,
}

impl Account {
    pub fn new(user: impl Into<String>, calendar: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            calendar: calendar.into(),
        }
    }
}

/// Outcome of a batch publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    /// Users published, with the number of blocks pushed for each.
    pub published: Vec<(String, usize)>,
    /// Users skipped because no free/busy provider exists for them.
    pub skipped: Vec<String>,
    /// Users that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

pub struct FreeBusyPublisher<'a, S: ?Sized, E: ?Sized> {
    store: &'a S,
    expander: &'a E,
}

impl<'a, S, E> FreeBusyPublisher<'a, S, E>
where
    S: CalendarStore + ?Sized,
    E: RecurrenceExpander + ?Sized,
{
    pub fn new(store: &'a S, expander: &'a E) -> Self {
        Self { store, expander }
    }

    /// All occurrences in `folder` that may intersect `window`.
    ///
    /// Rows that fail to decode and recurrences that fail to expand are
    /// logged and skipped.
    ///
    /// # Errors
    /// Only store query failures are returned.
    pub fn collect_occurrences(&self, folder: &str, window: &TimeWindow) -> Result<Vec<Occurrence>> {
        let rows = self.store.query(folder, &window_restriction(window))?;
        tracing::debug!(folder, rows = rows.len(), "queried calendar");

        let mut occurrences = Vec::with_capacity(rows.len());
        for row in &rows {
            let item = match CalendarItem::from_row(row) {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(folder, error = %e, "skipping undecodable calendar row");
                    continue;
                }
            };
            match self.expander.expand(&item, window) {
                Ok(expanded) => occurrences.extend(expanded),
                Err(e) => {
                    tracing::warn!(
                        folder,
                        subject = %item.subject,
                        error = %e,
                        "skipping item whose recurrence failed to expand"
                    );
                }
            }
        }

        Ok(occurrences)
    }

    /// Merged busy blocks for `folder` within `window`.
    pub fn build_blocks(&self, folder: &str, window: &TimeWindow) -> Result<Vec<MergedInterval>> {
        let occurrences = self.collect_occurrences(folder, window)?;
        Ok(merger::merge(&occurrences))
    }

    /// Publish one account. Returns the number of blocks pushed.
    pub fn publish<K: FreeBusySink + ?Sized>(
        &self,
        account: &Account,
        window: &TimeWindow,
        sink: &mut K,
    ) -> Result<usize> {
        let blocks = self.build_blocks(&account.calendar, window)?;
        sink.publish(&account.user, window, &blocks)?;
        tracing::debug!(user = %account.user, blocks = blocks.len(), "published free/busy");
        Ok(blocks.len())
    }

    /// Publish every account, continuing past per-user failures.
    pub fn publish_all<K: FreeBusySink + ?Sized>(
        &self,
        accounts: &[Account],
        window: &TimeWindow,
        sink: &mut K,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        for account in accounts {
            match self.publish(account, window, sink) {
                Ok(count) => report.published.push((account.user.clone(), count)),
                Err(FreeBusyError::ProviderNotFound(_)) => {
                    tracing::info!(user = %account.user, "no free/busy provider, skipping");
                    report.skipped.push(account.user.clone());
                }
                Err(e) => {
                    tracing::warn!(user = %account.user, error = %e, "free/busy publish failed");
                    report.failed.push((account.user.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

/// What a [`MemorySink`] holds for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFreeBusy {
    pub window: TimeWindow,
    pub blocks: Vec<MergedInterval>,
}

/// In-memory sink. Only users registered as providers accept publishes.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    providers: BTreeSet<String>,
    published: BTreeMap<String, PublishedFreeBusy>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_providers<I, U>(users: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        Self {
            providers: users.into_iter().map(Into::into).collect(),
            published: BTreeMap::new(),
        }
    }

    pub fn add_provider(&mut self, user: impl Into<String>) {
        self.providers.insert(user.into());
    }

    pub fn published(&self, user: &str) -> Option<&PublishedFreeBusy> {
        self.published.get(user)
    }

    pub fn all_published(&self) -> &BTreeMap<String, PublishedFreeBusy> {
        &self.published
    }
}

impl FreeBusySink for MemorySink {
    fn publish(
        &mut self,
        user: &str,
        window: &TimeWindow,
        blocks: &[MergedInterval],
    ) -> Result<()> {
        if !self.providers.contains(user) {
            return Err(FreeBusyError::ProviderNotFound(user.to_string()));
        }
        self.published.insert(
            user.to_string(),
            PublishedFreeBusy {
                window: *window,
                blocks: blocks.to_vec(),
            },
        );
        Ok(())
    }
}
