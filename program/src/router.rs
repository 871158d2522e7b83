//! Routes a decoded instruction to the handler that owns it.
//!
//! Handlers check all of their preconditions before touching the state, so an
//! `Err` from [`MessageRouter::route`] always leaves `state` and `registry`
//! exactly as they were.

use solana_program::pubkey::Pubkey;

use crate::{
    commitment::CommitmentHasher, error::RaffleError, instruction::RaffleInstruction,
    registry::RaffleRegistry, state::ContractState,
};

/// What a successful instruction did, for logging and for the lamport
/// movements the processor performs afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    RaffleCreated { key: u64 },
    TicketsPurchased { raffle_id: u64, start: u64, amount: u64, payment: u64 },
    WinnerSelected { raffle_id: u64, winner: Option<Pubkey> },
    CounterIncremented { query_id: u64, counter: u64 },
    ProceedsReleased { amount: u64 },
}

pub struct MessageRouter<H> {
    hasher: H,
}

impl<H: CommitmentHasher> MessageRouter<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    pub fn route(
        &self,
        state: &mut ContractState,
        registry: &mut RaffleRegistry,
        caller: &Pubkey,
        instruction: RaffleInstruction,
    ) -> Result<Outcome, RaffleError> {
        match instruction {
            RaffleInstruction::Initialize { .. } => Err(RaffleError::AlreadyInitialized),
            RaffleInstruction::ChangeOwner { new_owner } => {
                state.access.change_owner(caller, new_owner)?;
                Ok(Outcome::Updated)
            }
            RaffleInstruction::ChangeSigner { new_signer } => {
                state.access.change_signer(caller, new_signer)?;
                Ok(Outcome::Updated)
            }
            RaffleInstruction::Pause => {
                state.access.pause(caller)?;
                Ok(Outcome::Updated)
            }
            RaffleInstruction::Unpause => {
                state.access.unpause(caller)?;
                Ok(Outcome::Updated)
            }
            RaffleInstruction::UpdateTicketPrice { ticket_price } => {
                state.access.ensure_owner(caller)?;
                state.ticket_price = ticket_price;
                Ok(Outcome::Updated)
            }
            RaffleInstruction::CreateRaffle { key, commitment } => {
                registry.create(&state.access, caller, key, commitment)?;
                Ok(Outcome::RaffleCreated { key })
            }
            RaffleInstruction::PurchaseTickets {
                raffle_id,
                account,
                amount,
                payment,
            } => {
                let start = registry.purchase_tickets(
                    &state.access,
                    state.ticket_price,
                    raffle_id,
                    account,
                    amount,
                    payment,
                )?;
                Ok(Outcome::TicketsPurchased {
                    raffle_id,
                    start,
                    amount,
                    payment,
                })
            }
            RaffleInstruction::RevealWinner {
                raffle_id,
                preimage,
            } => {
                let winner = registry.reveal_and_select_winner(
                    &state.access,
                    &self.hasher,
                    caller,
                    raffle_id,
                    &preimage,
                )?;
                Ok(Outcome::WinnerSelected { raffle_id, winner })
            }
            RaffleInstruction::Add { query_id, amount } => {
                state.counter = state
                    .counter
                    .checked_add(amount)
                    .ok_or(RaffleError::Overflow)?;
                Ok(Outcome::CounterIncremented {
                    query_id,
                    counter: state.counter,
                })
            }
            RaffleInstruction::WithdrawProceeds { amount } => {
                state.access.ensure_owner(caller)?;
                Ok(Outcome::ProceedsReleased { amount })
            }
        }
    }
}
