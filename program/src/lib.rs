// Commit-reveal raffle program
// Raffles bound to a sha256 commitment, weighted ticket ranges, owner/signer access control

pub mod access;
pub mod commitment;
pub mod error;
pub mod instruction;
pub mod processor;
pub mod registry;
pub mod router;
pub mod state;
pub mod ticket_tree;
pub mod utils;
pub mod winner;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub use solana_program;

/// Library entry used by tests and by programs linking this crate with `no-entrypoint`
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
