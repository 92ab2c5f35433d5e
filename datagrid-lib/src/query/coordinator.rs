//! Per-table fetch coordination with stale-result suppression.
//!
//! The coordinator never performs I/O. [`QueryCoordinator::request`] decides
//! whether a descriptor needs a fetch and hands out a [`FetchTicket`]; whoever
//! runs the fetch returns the ticket with the outcome to
//! [`QueryCoordinator::complete`], which commits it only if the ticket still
//! belongs to the table's live query.
//!
//! Each table carries a monotonically increasing generation. Issuing a fetch
//! bumps it, so a completion is current exactly when its ticket generation
//! equals the table's generation. Superseded fetches are not aborted, their
//! results are simply dropped at completion time.

use std::collections::HashMap;

use log::debug;
use log::trace;

use super::FetchResult;
use super::QueryDescriptor;
use crate::column::TableId;
use crate::error::FetchError;

/// Status of the table's current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// A fetch for the current query is outstanding.
    Pending,
    /// The last fetch for the current query succeeded.
    Success,
    /// The last fetch for the current query failed.
    Error,
}

/// Proof that a fetch was issued for a specific table, query and generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    table_id: TableId,
    generation: u64,
    descriptor: QueryDescriptor,
}

impl FetchTicket {
    /// Query to send to the remote collaborator.
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }
}

/// Read-only view of a table's current query result.
#[derive(Debug)]
pub struct CurrentResult<'a, R> {
    /// Rows committed for the current query, if any.
    pub data: Option<&'a FetchResult<R>>,
    /// Status of the current query.
    pub status: FetchStatus,
    /// Failure of the last attempt, when `status` is [`FetchStatus::Error`].
    pub error: Option<&'a FetchError>,
    /// A fetch is outstanding while rows for the current query are shown.
    pub revalidating: bool,
}

struct QuerySlot<R> {
    descriptor: QueryDescriptor,
    generation: u64,
    in_flight: bool,
    status: FetchStatus,
    result: Option<FetchResult<R>>,
    error: Option<FetchError>,
}

/// Tracks one logical current query per table.
pub struct QueryCoordinator<R> {
    slots: HashMap<TableId, QuerySlot<R>>,
}

impl<R> Default for QueryCoordinator<R> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<R> QueryCoordinator<R> {
    /// Creates a coordinator with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `descriptor` the table's live query.
    ///
    /// Returns a ticket when a fetch must be issued, or `None` when the table
    /// already tracks a structurally equal query (in flight or settled).
    /// A new query clears the previously committed rows: they answered a
    /// different question.
    pub fn request(&mut self, table_id: &TableId, descriptor: QueryDescriptor) -> Option<FetchTicket> {
        if self
            .slots
            .get(table_id)
            .is_some_and(|slot| slot.descriptor == descriptor)
        {
            trace!("query for table '{}' unchanged, not refetching", table_id);
            return None;
        }

        let slot = self
            .slots
            .entry(table_id.clone())
            .or_insert_with(|| QuerySlot {
                descriptor: descriptor.clone(),
                generation: 0,
                in_flight: false,
                status: FetchStatus::Pending,
                result: None,
                error: None,
            });
        slot.descriptor = descriptor;
        slot.generation += 1;
        slot.result = None;
        slot.error = None;
        slot.in_flight = true;
        slot.status = FetchStatus::Pending;
        debug!(
            "issuing fetch for table '{}' (generation {})",
            table_id, slot.generation
        );

        Some(FetchTicket {
            table_id: table_id.clone(),
            generation: slot.generation,
            descriptor: slot.descriptor.clone(),
        })
    }

    /// Re-issues the table's live query in the background.
    ///
    /// Committed rows stay visible until the new result arrives. Returns
    /// `None` if the table has no query yet or one is already in flight.
    pub fn revalidate(&mut self, table_id: &TableId) -> Option<FetchTicket> {
        let slot = self.slots.get_mut(table_id)?;
        if slot.in_flight {
            return None;
        }

        slot.generation += 1;
        slot.in_flight = true;
        slot.status = FetchStatus::Pending;
        debug!(
            "revalidating table '{}' (generation {})",
            table_id, slot.generation
        );

        Some(FetchTicket {
            table_id: table_id.clone(),
            generation: slot.generation,
            descriptor: slot.descriptor.clone(),
        })
    }

    /// Delivers the outcome of a fetch.
    ///
    /// Returns `true` if the outcome was committed, `false` if the ticket was
    /// stale (superseded by a newer query or revalidation) and the outcome was
    /// discarded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<FetchResult<R>, FetchError>,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(&ticket.table_id) else {
            debug!("discarding fetch for unknown table '{}'", ticket.table_id);
            return false;
        };

        if ticket.generation != slot.generation || ticket.descriptor != slot.descriptor {
            debug!(
                "discarding stale fetch for table '{}' (generation {}, current {})",
                ticket.table_id, ticket.generation, slot.generation
            );
            return false;
        }

        slot.in_flight = false;
        match outcome {
            Ok(result) => {
                slot.status = FetchStatus::Success;
                slot.result = Some(result);
                slot.error = None;
            }
            Err(err) => {
                log::warn!("fetch for table '{}' failed: {}", ticket.table_id, err);
                slot.status = FetchStatus::Error;
                slot.error = Some(err);
            }
        }
        true
    }

    /// Returns the table's current result, or `None` if it never requested one.
    pub fn current(&self, table_id: &TableId) -> Option<CurrentResult<'_, R>> {
        self.slots.get(table_id).map(|slot| CurrentResult {
            data: slot.result.as_ref(),
            status: slot.status,
            error: slot.error.as_ref(),
            revalidating: slot.in_flight && slot.result.is_some(),
        })
    }

    /// Returns `true` if a fetch for the table's live query is outstanding.
    pub fn is_in_flight(&self, table_id: &TableId) -> bool {
        self.slots.get(table_id).is_some_and(|slot| slot.in_flight)
    }

    /// Drops everything tracked for a table. Outstanding tickets become stale.
    pub fn forget(&mut self, table_id: &TableId) {
        self.slots.remove(table_id);
    }
}
