// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! ABI of the Lottery application */

use std::fmt;

use async_graphql::{Request, Response};
use linera_sdk::linera_base_types::{AccountOwner, Amount, ContractAbi, ServiceAbi};
use serde::{Deserialize, Serialize};

pub struct LotteryAbi;

impl ContractAbi for LotteryAbi {
    type Operation = LotteryOperation;
    type Response = LotteryResponse;
}

impl ServiceAbi for LotteryAbi {
    type Query = Request;
    type QueryResponse = Response;
}

/// Creation-time configuration. The operator is fixed for the lifetime of
/// the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LotteryParameters {
    pub operator: AccountOwner,
}

/// Initial round configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstantiationArgument {
    pub ticket_cost: Amount,
    pub max_tickets: u64,
}

impl Default for InstantiationArgument {
    fn default() -> Self {
        InstantiationArgument {
            ticket_cost: Amount::from_tokens(1),
            max_tickets: 5,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub enum LotteryOperation {
    /// Set a new price per ticket. Operator only, and only before any
    /// ticket of the current round has been sold.
    SetTicketCost { new_cost: Amount },
    /// Set a new ticket supply and reset availability to it. Operator
    /// only, same freshness rule as `SetTicketCost`.
    SetMaxTickets { new_max: u64 },
    /// Buy `count` tickets, paying `payment` into the pot. Overpayment
    /// beyond `count * ticket_cost` is returned to the buyer. The
    /// purchase occupies a single slot in the winner selection space
    /// regardless of `count`.
    BuyTickets { count: u64, payment: Amount },
    /// Pay the whole pot to the holder of the slot selected by the block
    /// timestamp. Operator only, and only once the round is sold out.
    /// The selection is publicly predictable; this is not a fair
    /// randomness source.
    DrawWinner,
}

#[derive(Debug, Deserialize, Serialize)]
pub enum LotteryResponse {
    Ok,
    Ticket {
        slot: u64,
        change: Amount,
    },
    Winner {
        slot: u64,
        owner: AccountOwner,
        prize: Amount,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub enum Message {
    Notify,
}

/// Why an operation was refused. The code is surfaced verbatim in the
/// abort message so callers can branch on the failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotteryError {
    /// Caller is not the operator.
    Unauthorized,
    /// Reconfiguration attempted while tickets are mid-sale.
    RoundInProgress,
    /// Non-positive ticket cost or supply.
    InvalidParameter,
    /// No tickets left in the current round.
    SoldOut,
    /// Purchase of fewer than one ticket.
    InvalidCount,
    /// Purchase exceeds the remaining supply.
    InsufficientSupply,
    /// Payment below `count * ticket_cost`.
    InsufficientPayment,
    /// Draw attempted while tickets remain unsold.
    RoundNotComplete,
    /// Call outside the entrypoint surface, e.g. a bare transfer.
    MethodNotAllowed,
}

impl LotteryError {
    pub fn code(&self) -> &'static str {
        match self {
            LotteryError::Unauthorized => "UNAUTHORIZED",
            LotteryError::RoundInProgress => "ROUND_IN_PROGRESS",
            LotteryError::InvalidParameter => "INVALID_PARAMETER",
            LotteryError::SoldOut => "SOLD_OUT",
            LotteryError::InvalidCount => "INVALID_COUNT",
            LotteryError::InsufficientSupply => "INSUFFICIENT_SUPPLY",
            LotteryError::InsufficientPayment => "INSUFFICIENT_PAYMENT",
            LotteryError::RoundNotComplete => "ROUND_NOT_COMPLETE",
            LotteryError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
        }
    }
}

impl fmt::Display for LotteryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::error::Error for LotteryError {}
