// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema};
use linera_sdk::{
    linera_base_types::{AccountOwner, Amount, WithServiceAbi},
    views::View,
    Service, ServiceRuntime,
};
use lottery::{LotteryAbi, LotteryOperation};

use self::state::{DrawRecord, LotteryState};

pub struct LotteryService {
    state: LotteryState,
    runtime: Arc<ServiceRuntime<Self>>,
}

linera_sdk::service!(LotteryService);

impl WithServiceAbi for LotteryService {
    type Abi = LotteryAbi;
}

impl Service for LotteryService {
    type Parameters = lottery::LotteryParameters;

    async fn new(runtime: ServiceRuntime<Self>) -> Self {
        let state = LotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LotteryService {
            state,
            runtime: Arc::new(runtime),
        }
    }

    async fn handle_query(&self, request: Request) -> Response {
        // Snapshot the round so the schema can answer without going back
        // to storage.
        let mut players = Vec::with_capacity(self.state.players.count());
        for index in 0..self.state.players.count() {
            if let Ok(Some(player)) = self.state.players.get(index).await {
                players.push(player);
            }
        }
        let mut draws = Vec::with_capacity(self.state.draws.count());
        for index in 0..self.state.draws.count() {
            if let Ok(Some(draw)) = self.state.draws.get(index).await {
                draws.push(draw);
            }
        }

        let schema = Schema::build(
            QueryRoot {
                runtime: self.runtime.clone(),
                ticket_cost: *self.state.ticket_cost.get(),
                tickets_available: *self.state.tickets_available.get(),
                max_tickets: *self.state.max_tickets.get(),
                round_is_fresh: self.state.round_is_fresh(),
                players,
                draws,
            },
            MutationRoot {
                runtime: self.runtime.clone(),
            },
            EmptySubscription,
        )
        .finish();
        schema.execute(request).await
    }
}

struct QueryRoot {
    runtime: Arc<ServiceRuntime<LotteryService>>,
    ticket_cost: Amount,
    tickets_available: u64,
    max_tickets: u64,
    round_is_fresh: bool,
    players: Vec<AccountOwner>,
    draws: Vec<DrawRecord>,
}

#[Object]
impl QueryRoot {
    async fn ticket_cost(&self) -> Amount {
        self.ticket_cost
    }

    async fn tickets_available(&self) -> u64 {
        self.tickets_available
    }

    async fn max_tickets(&self) -> u64 {
        self.max_tickets
    }

    async fn operator(&self) -> AccountOwner {
        self.runtime.application_parameters().operator
    }

    async fn round_is_fresh(&self) -> bool {
        self.round_is_fresh
    }

    /// Ticket slots of the current round, in purchase order.
    async fn players(&self) -> Vec<AccountOwner> {
        self.players.clone()
    }

    /// The prize pot collected so far.
    async fn pot(&self) -> String {
        self.runtime.chain_balance().to_string()
    }

    /// Settled draws, oldest first.
    async fn draws(&self) -> Vec<DrawRecord> {
        self.draws.clone()
    }
}

struct MutationRoot {
    runtime: Arc<ServiceRuntime<LotteryService>>,
}

#[Object]
impl MutationRoot {
    async fn set_ticket_cost(&self, new_cost: String) -> String {
        self.runtime.schedule_operation(&LotteryOperation::SetTicketCost {
            new_cost: new_cost.parse::<Amount>().unwrap_or_default(),
        });
        "SetTicketCost operation scheduled".to_string()
    }

    async fn set_max_tickets(&self, new_max: u64) -> String {
        self.runtime
            .schedule_operation(&LotteryOperation::SetMaxTickets { new_max });
        "SetMaxTickets operation scheduled".to_string()
    }

    async fn buy_tickets(&self, count: u64, payment: String) -> String {
        self.runtime.schedule_operation(&LotteryOperation::BuyTickets {
            count,
            payment: payment.parse::<Amount>().unwrap_or_default(),
        });
        "BuyTickets operation scheduled".to_string()
    }

    async fn draw_winner(&self) -> String {
        self.runtime
            .schedule_operation(&LotteryOperation::DrawWinner);
        "DrawWinner operation scheduled".to_string()
    }
}
