use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{error::RaffleError, ticket_tree::TicketIntervalTree};

/// Owner and signer roles plus the pause switch
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessControlState {
    /// Administrative authority; the only role that can change roles or pause
    pub owner: Pubkey,
    /// Operator allowed to create and reveal raffles alongside the owner
    pub signer: Pubkey,
    pub paused: bool,
}

/// One commit-reveal raffle, stored in its own account
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    pub id: u64,
    /// sha256 of the secret preimage, fixed at creation
    pub commitment: [u8; 32],
    /// Set once a matching preimage has been revealed
    pub opened: bool,
    pub revealed_randomness: Option<[u8; 32]>,
    pub total_tickets: u64,
    pub winner: Option<Pubkey>,
    pub ticket_ledger: TicketIntervalTree,
    pub per_account_totals: BTreeMap<Pubkey, u64>,
}

impl Raffle {
    pub fn new(id: u64, commitment: [u8; 32]) -> Self {
        Self {
            id,
            commitment,
            opened: false,
            revealed_randomness: None,
            total_tickets: 0,
            winner: None,
            ticket_ledger: TicketIntervalTree::new(),
            per_account_totals: BTreeMap::new(),
        }
    }

    pub fn player_amount(&self, account: &Pubkey) -> u64 {
        self.per_account_totals.get(account).copied().unwrap_or(0)
    }

    /// The commitment until the raffle is opened, the revealed randomness after.
    pub fn current_randomness(&self) -> [u8; 32] {
        self.revealed_randomness.unwrap_or(self.commitment)
    }

    /// Bytes the encoded record occupies; the raffle account is grown to fit.
    pub fn packed_len(&self) -> Result<usize, ProgramError> {
        self.try_to_vec()
            .map(|encoded| encoded.len())
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }

    pub fn load(src: &[u8]) -> Result<Self, ProgramError> {
        unpack_record(src)
    }

    pub fn save(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        pack_record(self, dst)
    }
}

/// Root record of an instance, stored in the fixed-size state account
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractState {
    pub is_initialized: bool,
    /// Instance id, also part of the state account seeds
    pub id: u64,
    pub access: AccessControlState,
    /// Price per ticket in lamports
    pub ticket_price: u64,
    /// Counter bumped by the `Add` instruction
    pub counter: u64,
}

impl ContractState {
    /// Encoded size; every field is fixed width
    pub const LEN: usize = 1 + 8 + (32 + 32 + 1) + 8 + 8;

    pub fn new(id: u64, owner: Pubkey, ticket_price: u64) -> Self {
        Self {
            is_initialized: true,
            id,
            access: AccessControlState {
                owner,
                signer: owner,
                paused: false,
            },
            ticket_price,
            counter: 0,
        }
    }

    /// Decodes an initialized state from account data; trailing bytes are ignored.
    pub fn load(src: &[u8]) -> Result<Self, ProgramError> {
        let state: Self = unpack_record(src)?;
        if !state.is_initialized {
            return Err(RaffleError::NotInitialized.into());
        }
        Ok(state)
    }

    /// Returns true when `src` holds an initialized state.
    pub fn is_initialized_in(src: &[u8]) -> bool {
        src.first().copied().unwrap_or(0) != 0
    }

    pub fn save(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        pack_record(self, dst)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> Pubkey {
        self.access.owner
    }

    pub fn signer(&self) -> Pubkey {
        self.access.signer
    }

    pub fn is_paused(&self) -> bool {
        self.access.paused
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn ticket_price(&self) -> u64 {
        self.ticket_price
    }
}

fn unpack_record<T: BorshDeserialize>(src: &[u8]) -> Result<T, ProgramError> {
    T::deserialize(&mut &src[..]).map_err(|e| ProgramError::BorshIoError(e.to_string()))
}

fn pack_record<T: BorshSerialize>(record: &T, dst: &mut [u8]) -> Result<(), ProgramError> {
    let encoded = record
        .try_to_vec()
        .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
    if encoded.len() > dst.len() {
        msg!(
            "Record needs {} bytes but the account holds {}",
            encoded.len(),
            dst.len()
        );
        return Err(ProgramError::AccountDataTooSmall);
    }
    dst[..encoded.len()].copy_from_slice(&encoded);
    Ok(())
}
