// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use linera_sdk::{
    linera_base_types::{Account, AccountOwner, Amount, WithContractAbi},
    views::{RootView, View},
    Contract, ContractRuntime,
};
use lottery::{LotteryAbi, LotteryError, LotteryOperation, LotteryParameters, LotteryResponse, Message};

use self::state::LotteryState;

pub struct LotteryContract {
    state: LotteryState,
    runtime: ContractRuntime<Self>,
}

linera_sdk::contract!(LotteryContract);

impl WithContractAbi for LotteryContract {
    type Abi = LotteryAbi;
}

impl Contract for LotteryContract {
    type Message = Message;
    type Parameters = LotteryParameters;
    type InstantiationArgument = lottery::InstantiationArgument;
    type EventValue = ();

    async fn load(runtime: ContractRuntime<Self>) -> Self {
        let state = LotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LotteryContract { state, runtime }
    }

    async fn instantiate(&mut self, argument: Self::InstantiationArgument) {
        // Validate that the operator parameter was configured.
        let _ = self.runtime.application_parameters();
        self.state
            .initialize(argument.ticket_cost, argument.max_tickets)
            .unwrap_or_else(|err| panic!("{}", err));
    }

    async fn execute_operation(&mut self, operation: Self::Operation) -> Self::Response {
        match operation {
            LotteryOperation::SetTicketCost { new_cost } => {
                let caller = self.caller();
                let operator = self.operator();
                match self.state.set_ticket_cost(caller, operator, new_cost) {
                    Ok(()) => LotteryResponse::Ok,
                    Err(err) => panic!("{}", err),
                }
            }

            LotteryOperation::SetMaxTickets { new_max } => {
                let caller = self.caller();
                let operator = self.operator();
                match self.state.set_max_tickets(caller, operator, new_max) {
                    Ok(()) => LotteryResponse::Ok,
                    Err(err) => panic!("{}", err),
                }
            }

            LotteryOperation::BuyTickets { count, payment } => {
                let buyer = self.caller();
                match self.state.buy_tickets(buyer, count, payment) {
                    Ok(receipt) => {
                        // The full payment goes into the pot first; change
                        // is returned from the pot. A buyer whose balance
                        // cannot cover the payment traps here, aborting
                        // the purchase atomically.
                        let pot = self.pot_account();
                        self.runtime.transfer(buyer, pot, payment);
                        if receipt.change > Amount::ZERO {
                            let refund = self.owner_account(buyer);
                            self.runtime
                                .transfer(AccountOwner::CHAIN, refund, receipt.change);
                        }
                        LotteryResponse::Ticket {
                            slot: receipt.slot,
                            change: receipt.change,
                        }
                    }
                    Err(err) => panic!("{}", err),
                }
            }

            LotteryOperation::DrawWinner => {
                let caller = self.caller();
                let operator = self.operator();
                let now = self.runtime.system_time();
                let prize = self.runtime.chain_balance();
                match self.state.draw_winner(caller, operator, now, prize).await {
                    Ok(record) => {
                        if record.prize > Amount::ZERO {
                            let winner = self.owner_account(record.winner);
                            self.runtime
                                .transfer(AccountOwner::CHAIN, winner, record.prize);
                        }
                        eprintln!(
                            "Round settled: slot {} wins {}, next round open",
                            record.slot, record.prize
                        );
                        LotteryResponse::Winner {
                            slot: record.slot,
                            owner: record.winner,
                            prize: record.prize,
                        }
                    }
                    Err(err) => panic!("{}", err),
                }
            }
        }
    }

    async fn execute_message(&mut self, _message: Self::Message) {
        // Messages are outside the entrypoint surface; refuse them so a
        // misdirected transfer fails loudly instead of feeding the pot.
        panic!("{}", LotteryError::MethodNotAllowed);
    }

    async fn store(mut self) {
        self.state.save().await.expect("Failed to save state");
    }
}

impl LotteryContract {
    fn caller(&mut self) -> AccountOwner {
        self.runtime
            .authenticated_signer()
            .expect("Authentication required")
    }

    fn operator(&mut self) -> AccountOwner {
        self.runtime.application_parameters().operator
    }

    /// The pot: the chain's own account, where ticket payments accumulate.
    fn pot_account(&mut self) -> Account {
        Account {
            chain_id: self.runtime.chain_id(),
            owner: AccountOwner::CHAIN,
        }
    }

    fn owner_account(&mut self, owner: AccountOwner) -> Account {
        Account {
            chain_id: self.runtime.chain_id(),
            owner,
        }
    }
}
