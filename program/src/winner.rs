use solana_program::pubkey::Pubkey;

use crate::{error::RaffleError, ticket_tree::TicketIntervalTree};

/// Reduces a big-endian 256-bit value modulo `modulus`.
pub fn reduce_randomness(randomness: &[u8; 32], modulus: u64) -> u64 {
    if modulus == 0 {
        return 0;
    }
    let modulus = modulus as u128;
    randomness
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus) as u64
}

/// Picks the owner of ticket `randomness mod total_tickets`.
///
/// Returns `Ok(None)` for a raffle with no tickets sold.
pub fn select(
    randomness: &[u8; 32],
    total_tickets: u64,
    ledger: &TicketIntervalTree,
) -> Result<Option<Pubkey>, RaffleError> {
    if total_tickets == 0 {
        return Ok(None);
    }
    let point = reduce_randomness(randomness, total_tickets);
    ledger.point_query(point).map(Some)
}
