// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_graphql::SimpleObject;
use linera_sdk::linera_base_types::{AccountOwner, Amount, Timestamp};
use linera_sdk::views::{linera_views, LogView, RegisterView, RootView, View, ViewStorageContext};
use lottery::LotteryError;
use serde::{Deserialize, Serialize};

/// Attos owed for `count` tickets at `cost` each. Saturates, so an
/// overflowing request can never pass the payment check.
fn total_price(cost: Amount, count: u64) -> u128 {
    u128::from(cost).saturating_mul(count as u128)
}

/// Slot selected by a draw at time `now`. Requires `max_tickets > 0`.
/// Derived from the block timestamp alone, so it is publicly predictable.
fn winning_slot(now: Timestamp, max_tickets: u64) -> u64 {
    now.micros() % max_tickets
}

/// A settled draw.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct DrawRecord {
    pub slot: u64,
    pub winner: AccountOwner,
    pub prize: Amount,
    /// Block time of the draw, in microseconds.
    pub drawn_at: u64,
}

/// Outcome of a successful ticket purchase.
#[derive(Debug, Clone, Copy)]
pub struct TicketReceipt {
    /// Index of the slot the purchase occupies in the player log.
    pub slot: u64,
    /// Overpayment owed back to the buyer.
    pub change: Amount,
}

/// The application state of the Lottery.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct LotteryState {
    /// Ticket slots of the current round, one per purchase, in purchase
    /// order. Cleared when a draw settles the round.
    pub players: LogView<AccountOwner>,
    /// Price of a single ticket.
    pub ticket_cost: RegisterView<Amount>,
    /// Unsold tickets remaining in the current round.
    pub tickets_available: RegisterView<u64>,
    /// Total tickets per round.
    pub max_tickets: RegisterView<u64>,
    /// Settled draws, oldest first.
    pub draws: LogView<DrawRecord>,
}

#[allow(dead_code)]
impl LotteryState {
    /// Sets up the first round.
    pub fn initialize(&mut self, ticket_cost: Amount, max_tickets: u64) -> Result<(), LotteryError> {
        if ticket_cost == Amount::ZERO || max_tickets == 0 {
            return Err(LotteryError::InvalidParameter);
        }
        self.ticket_cost.set(ticket_cost);
        self.max_tickets.set(max_tickets);
        self.tickets_available.set(max_tickets);
        Ok(())
    }

    /// A round is fresh while no ticket has been sold since the last
    /// reset. Reconfiguration is only allowed in this phase.
    pub fn round_is_fresh(&self) -> bool {
        *self.tickets_available.get() == *self.max_tickets.get()
    }

    pub fn set_ticket_cost(
        &mut self,
        caller: AccountOwner,
        operator: AccountOwner,
        new_cost: Amount,
    ) -> Result<(), LotteryError> {
        if caller != operator {
            return Err(LotteryError::Unauthorized);
        }
        if !self.round_is_fresh() {
            return Err(LotteryError::RoundInProgress);
        }
        if new_cost == Amount::ZERO {
            return Err(LotteryError::InvalidParameter);
        }
        self.ticket_cost.set(new_cost);
        Ok(())
    }

    pub fn set_max_tickets(
        &mut self,
        caller: AccountOwner,
        operator: AccountOwner,
        new_max: u64,
    ) -> Result<(), LotteryError> {
        if caller != operator {
            return Err(LotteryError::Unauthorized);
        }
        if !self.round_is_fresh() {
            return Err(LotteryError::RoundInProgress);
        }
        if new_max == 0 {
            return Err(LotteryError::InvalidParameter);
        }
        self.max_tickets.set(new_max);
        self.tickets_available.set(new_max);
        Ok(())
    }

    /// Registers a purchase of `count` tickets paid for with `payment`.
    /// The purchase occupies a single slot regardless of `count`, so a
    /// multi-ticket buyer has the same odds as a single-ticket buyer.
    pub fn buy_tickets(
        &mut self,
        buyer: AccountOwner,
        count: u64,
        payment: Amount,
    ) -> Result<TicketReceipt, LotteryError> {
        let available = *self.tickets_available.get();
        if available == 0 {
            return Err(LotteryError::SoldOut);
        }
        if count == 0 {
            return Err(LotteryError::InvalidCount);
        }
        if count > available {
            return Err(LotteryError::InsufficientSupply);
        }
        let due = total_price(*self.ticket_cost.get(), count);
        if u128::from(payment) < due {
            return Err(LotteryError::InsufficientPayment);
        }

        let slot = self.players.count() as u64;
        self.players.push(buyer);
        self.tickets_available.set(available - count);

        Ok(TicketReceipt {
            slot,
            change: Amount::from_attos(u128::from(payment) - due),
        })
    }

    /// Settles the current round: selects the winning slot from the block
    /// timestamp, records the draw and resets the round. The slot lookup
    /// misses (and aborts the draw) only when multi-ticket purchases left
    /// the player log shorter than `max_tickets`.
    pub async fn draw_winner(
        &mut self,
        caller: AccountOwner,
        operator: AccountOwner,
        now: Timestamp,
        prize: Amount,
    ) -> Result<DrawRecord, LotteryError> {
        if caller != operator {
            return Err(LotteryError::Unauthorized);
        }
        if *self.tickets_available.get() != 0 {
            return Err(LotteryError::RoundNotComplete);
        }

        let max_tickets = *self.max_tickets.get();
        let slot = winning_slot(now, max_tickets);
        let winner = self
            .players
            .get(slot as usize)
            .await
            .expect("Failed to read player log")
            .unwrap_or_else(|| panic!("No ticket slot at winning index {slot}"));

        let record = DrawRecord {
            slot,
            winner,
            prize,
            drawn_at: now.micros(),
        };
        self.draws.push(record.clone());

        self.players.clear();
        self.tickets_available.set(max_tickets);

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_price_saturates_instead_of_wrapping() {
        let cost = Amount::from_attos(u128::MAX / 2);
        assert_eq!(total_price(cost, 3), u128::MAX);
    }

    #[test]
    fn winning_slot_stays_below_supply() {
        for micros in [0u64, 1, 19, 20, 12_345_678] {
            assert!(winning_slot(Timestamp::from(micros), 5) < 5);
        }
        assert_eq!(winning_slot(Timestamp::from(20), 5), 0);
        assert_eq!(winning_slot(Timestamp::from(23), 5), 3);
    }
}
