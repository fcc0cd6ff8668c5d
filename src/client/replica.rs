use std::collections::HashMap;

use crate::domain::{BoardEvent, Card, List};
use crate::services::move_engine::position_between;

/// Handle for one in-flight move request: pass it back to `confirm` with the
/// server's response, or to `reject` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTicket {
    revision: u64,
}

#[derive(Debug, Clone)]
struct PendingMove {
    /// Local revision of the newest optimistic move for this card.
    revision: u64,
    /// Last server-confirmed state, restored on rejection.
    snapshot: Card,
    /// Number of stacked in-flight moves since the snapshot.
    in_flight: u64,
}

impl PendingMove {
    /// Server version the newest in-flight request will produce. A broadcast
    /// at or below this reflects either our own move echoing back or an
    /// older state; only something strictly newer may overwrite.
    fn expected_version(&self) -> i64 {
        self.snapshot.version + self.in_flight as i64
    }
}

/// Client-side speculative board state.
///
/// A drag gesture applies its move here immediately; the authoritative
/// request runs in the background and its outcome (or a newer broadcast)
/// corrects any divergence. The server remains the sole authority for order
/// values: everything this model computes is provisional.
#[derive(Debug, Default)]
pub struct BoardReplica {
    lists: HashMap<String, List>,
    cards: HashMap<String, Card>,
    pending: HashMap<String, PendingMove>,
    next_revision: u64,
}

impl BoardReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full refetch: replaces everything and clears speculative state. Used
    /// on initial load and after a reconnect, since missed broadcasts are
    /// never replayed.
    pub fn load(&mut self, lists: Vec<List>, cards: Vec<Card>) {
        self.lists = lists.into_iter().map(|l| (l.id.clone(), l)).collect();
        self.cards = cards.into_iter().map(|c| (c.id.clone(), c)).collect();
        self.pending.clear();
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.get(card_id)
    }

    pub fn list(&self, list_id: &str) -> Option<&List> {
        self.lists.get(list_id)
    }

    /// Cards of one list in display order.
    pub fn cards_in_list(&self, list_id: &str) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self
            .cards
            .values()
            .filter(|c| c.list_id == list_id)
            .collect();
        cards.sort_by(|a, b| Card::display_order(a, b));
        cards
    }

    /// Applies a move speculatively and returns the ticket identifying the
    /// request now in flight. The provisional order value uses the same
    /// neighbor arithmetic as the server; the authoritative value arrives
    /// with the response.
    pub fn apply_optimistic_move(
        &mut self,
        card_id: &str,
        destination_list_id: &str,
        destination_index: usize,
    ) -> Option<MoveTicket> {
        if !self.cards.contains_key(card_id) {
            return None;
        }

        let position = self.provisional_position(card_id, destination_list_id, destination_index);

        let card = self.cards.get_mut(card_id)?;
        let snapshot = card.clone();

        card.list_id = destination_list_id.to_string();
        card.position = position;

        self.next_revision += 1;
        let revision = self.next_revision;

        self.pending
            .entry(card_id.to_string())
            .and_modify(|p| {
                p.revision = revision;
                p.in_flight += 1;
            })
            .or_insert(PendingMove {
                revision,
                snapshot,
                in_flight: 1,
            });

        Some(MoveTicket { revision })
    }

    /// Authoritative response for an in-flight move: server state replaces
    /// the speculation. A ticket superseded by a newer local move only
    /// shrinks the in-flight count; the newest request still owns the card.
    pub fn confirm(&mut self, card_id: &str, ticket: MoveTicket, authoritative: Card) {
        let Some(pending) = self.pending.get_mut(card_id) else {
            return;
        };

        if ticket.revision < pending.revision {
            pending.in_flight = pending.in_flight.saturating_sub(1);
            pending.snapshot = authoritative;
            return;
        }

        self.cards.insert(card_id.to_string(), authoritative);
        self.pending.remove(card_id);
    }

    /// Failed move: revert to the last known-good state. Stale tickets are
    /// ignored; the newest in-flight request decides.
    pub fn reject(&mut self, card_id: &str, ticket: MoveTicket) {
        let Some(pending) = self.pending.remove(card_id) else {
            return;
        };

        if ticket.revision < pending.revision {
            self.pending.insert(card_id.to_string(), pending);
            return;
        }

        self.cards.insert(card_id.to_string(), pending.snapshot);
    }

    pub fn has_pending(&self, card_id: &str) -> bool {
        self.pending.contains_key(card_id)
    }

    /// Broadcast ingestion. Events for cards with a move in flight are
    /// discarded unless demonstrably newer than the expected outcome of that
    /// request; everything else is taken at face value.
    pub fn apply_event(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::CardAdded { card } | BoardEvent::CardModified { card } => {
                if let Some(pending) = self.pending.get(&card.id) {
                    if card.version <= pending.expected_version() {
                        return;
                    }
                    self.pending.remove(&card.id);
                }
                self.cards.insert(card.id.clone(), card);
            }
            BoardEvent::CardRemoved { card } => {
                self.pending.remove(&card.id);
                self.cards.remove(&card.id);
            }
            BoardEvent::ListAdded { list } | BoardEvent::ListModified { list } => {
                self.lists.insert(list.id.clone(), list);
            }
            BoardEvent::ListRemoved { list } => {
                self.lists.remove(&list.id);
                self.cards.retain(|_, c| c.list_id != list.id);
                let cards = &self.cards;
                self.pending.retain(|card_id, _| cards.contains_key(card_id));
            }
        }
    }

    fn provisional_position(
        &self,
        moving_card_id: &str,
        destination_list_id: &str,
        destination_index: usize,
    ) -> f64 {
        let mut visible = self.cards_in_list(destination_list_id);
        visible.retain(|c| c.id != moving_card_id);

        let index = destination_index.min(visible.len());
        let before = index.checked_sub(1).map(|i| visible[i].position);
        let after = visible.get(index).map(|c| c.position);

        // Precision exhaustion renumbers on the server; locally the stale
        // midpoint is good enough until the authoritative value lands.
        position_between(before, after).unwrap_or_else(|| before.or(after).unwrap_or(0.0))
    }
}
