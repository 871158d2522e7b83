use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::utils::find_raffle_address;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RaffleInstruction {
    /// Deploy a program instance: create and initialize its state account
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The owner, pays for the state account
    /// 1. `[writable]` The state account (PDA of `["state", id]`)
    /// 2. `[]` The system program
    Initialize {
        /// Instance id, part of the state account seeds
        id: u64,
        /// Price per ticket in lamports
        ticket_price: u64,
    },

    /// Replace the owner (owner only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Current owner
    /// 1. `[writable]` The state account
    ChangeOwner { new_owner: Pubkey },

    /// Replace the signer (owner only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Current owner
    /// 1. `[writable]` The state account
    ChangeSigner { new_signer: Pubkey },

    /// Block raffle creation and ticket purchases (owner only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Current owner
    /// 1. `[writable]` The state account
    Pause,

    /// Lift a pause (owner only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Current owner
    /// 1. `[writable]` The state account
    Unpause,

    /// Change the price per ticket (owner only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Current owner
    /// 1. `[writable]` The state account
    UpdateTicketPrice { ticket_price: u64 },

    /// Open a new raffle bound to a randomness commitment (owner or signer)
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Owner or signer, pays for the raffle account
    /// 1. `[writable]` The state account
    /// 2. `[writable]` The raffle account (PDA of `["raffle", state, key]`)
    /// 3. `[]` The system program
    CreateRaffle {
        key: u64,
        /// sha256 of the secret preimage revealed later
        commitment: [u8; 32],
    },

    /// Buy tickets for `account`, paid by the transaction signer
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The payer, also covers rent for the grown raffle account
    /// 1. `[writable]` The state account, receives the payment
    /// 2. `[writable]` The raffle account
    /// 3. `[]` The system program
    PurchaseTickets {
        raffle_id: u64,
        /// Account credited with the tickets
        account: Pubkey,
        amount: u64,
        /// Lamports transferred, at least `ticket_price * amount`
        payment: u64,
    },

    /// Reveal the commitment preimage and draw the winner (owner or signer)
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Owner or signer, covers rent for the grown raffle account
    /// 1. `[writable]` The state account
    /// 2. `[writable]` The raffle account
    /// 3. `[]` The system program
    RevealWinner { raffle_id: u64, preimage: Vec<u8> },

    /// Increment the counter by `amount`
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any account
    /// 1. `[writable]` The state account
    Add { query_id: u64, amount: u64 },

    /// Move collected payments to the owner, keeping the state account rent exempt
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Current owner
    /// 1. `[writable]` The state account
    WithdrawProceeds { amount: u64 },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        // serializing into a Vec cannot fail
        self.try_to_vec().unwrap_or_default()
    }

    /// Key of the raffle whose account the instruction reads and writes.
    pub fn raffle_key(&self) -> Option<u64> {
        match self {
            Self::CreateRaffle { key, .. } => Some(*key),
            Self::PurchaseTickets { raffle_id, .. } | Self::RevealWinner { raffle_id, .. } => {
                Some(*raffle_id)
            }
            _ => None,
        }
    }

    /// Variant name used in program logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "Initialize",
            Self::ChangeOwner { .. } => "Change Owner",
            Self::ChangeSigner { .. } => "Change Signer",
            Self::Pause => "Pause",
            Self::Unpause => "Unpause",
            Self::UpdateTicketPrice { .. } => "Update Ticket Price",
            Self::CreateRaffle { .. } => "Create Raffle",
            Self::PurchaseTickets { .. } => "Purchase Tickets",
            Self::RevealWinner { .. } => "Reveal Winner",
            Self::Add { .. } => "Add",
            Self::WithdrawProceeds { .. } => "Withdraw Proceeds",
        }
    }
}

fn admin_instruction(
    program_id: &Pubkey,
    caller: &Pubkey,
    state: &Pubkey,
    instruction: RaffleInstruction,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(*state, false),
        ],
        data: instruction.pack(),
    }
}

fn raffle_instruction(
    program_id: &Pubkey,
    caller: &Pubkey,
    state: &Pubkey,
    instruction: RaffleInstruction,
) -> Instruction {
    let key = instruction.raffle_key().unwrap_or_default();
    let (raffle, _) = find_raffle_address(program_id, state, key);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*caller, true),
            AccountMeta::new(*state, false),
            AccountMeta::new(raffle, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: instruction.pack(),
    }
}

/// Create initialize instruction
pub fn initialize(
    program_id: &Pubkey,
    owner: &Pubkey,
    state: &Pubkey,
    id: u64,
    ticket_price: u64,
) -> Instruction {
    let data = RaffleInstruction::Initialize { id, ticket_price }.pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*state, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

pub fn change_owner(
    program_id: &Pubkey,
    owner: &Pubkey,
    state: &Pubkey,
    new_owner: &Pubkey,
) -> Instruction {
    admin_instruction(
        program_id,
        owner,
        state,
        RaffleInstruction::ChangeOwner {
            new_owner: *new_owner,
        },
    )
}

pub fn change_signer(
    program_id: &Pubkey,
    owner: &Pubkey,
    state: &Pubkey,
    new_signer: &Pubkey,
) -> Instruction {
    admin_instruction(
        program_id,
        owner,
        state,
        RaffleInstruction::ChangeSigner {
            new_signer: *new_signer,
        },
    )
}

pub fn pause(program_id: &Pubkey, owner: &Pubkey, state: &Pubkey) -> Instruction {
    admin_instruction(program_id, owner, state, RaffleInstruction::Pause)
}

pub fn unpause(program_id: &Pubkey, owner: &Pubkey, state: &Pubkey) -> Instruction {
    admin_instruction(program_id, owner, state, RaffleInstruction::Unpause)
}

pub fn update_ticket_price(
    program_id: &Pubkey,
    owner: &Pubkey,
    state: &Pubkey,
    ticket_price: u64,
) -> Instruction {
    admin_instruction(
        program_id,
        owner,
        state,
        RaffleInstruction::UpdateTicketPrice { ticket_price },
    )
}

/// Create create_raffle instruction
pub fn create_raffle(
    program_id: &Pubkey,
    operator: &Pubkey,
    state: &Pubkey,
    key: u64,
    commitment: [u8; 32],
) -> Instruction {
    raffle_instruction(
        program_id,
        operator,
        state,
        RaffleInstruction::CreateRaffle { key, commitment },
    )
}

/// Create purchase_tickets instruction
pub fn purchase_tickets(
    program_id: &Pubkey,
    payer: &Pubkey,
    state: &Pubkey,
    raffle_id: u64,
    account: &Pubkey,
    amount: u64,
    payment: u64,
) -> Instruction {
    raffle_instruction(
        program_id,
        payer,
        state,
        RaffleInstruction::PurchaseTickets {
            raffle_id,
            account: *account,
            amount,
            payment,
        },
    )
}

/// Create reveal_winner instruction
pub fn reveal_winner(
    program_id: &Pubkey,
    operator: &Pubkey,
    state: &Pubkey,
    raffle_id: u64,
    preimage: &[u8],
) -> Instruction {
    raffle_instruction(
        program_id,
        operator,
        state,
        RaffleInstruction::RevealWinner {
            raffle_id,
            preimage: preimage.to_vec(),
        },
    )
}

pub fn add(
    program_id: &Pubkey,
    caller: &Pubkey,
    state: &Pubkey,
    query_id: u64,
    amount: u64,
) -> Instruction {
    admin_instruction(
        program_id,
        caller,
        state,
        RaffleInstruction::Add { query_id, amount },
    )
}

pub fn withdraw_proceeds(
    program_id: &Pubkey,
    owner: &Pubkey,
    state: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*state, false),
        ],
        data: RaffleInstruction::WithdrawProceeds { amount }.pack(),
    }
}
