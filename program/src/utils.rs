use solana_program::pubkey::Pubkey;

/// Seed prefix of the state account PDA
pub const STATE_SEED: &[u8] = b"state";

/// Seed prefix of a raffle account PDA
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Find the program derived address holding the state of instance `id`
pub fn find_state_address(program_id: &Pubkey, id: u64) -> (Pubkey, u8) {
    let id_bytes = id.to_le_bytes();
    Pubkey::find_program_address(&[STATE_SEED, &id_bytes], program_id)
}

/// Find the program derived address of raffle `key` within the instance at `state`
pub fn find_raffle_address(program_id: &Pubkey, state: &Pubkey, key: u64) -> (Pubkey, u8) {
    let key_bytes = key.to_le_bytes();
    Pubkey::find_program_address(&[RAFFLE_SEED, state.as_ref(), &key_bytes], program_id)
}

/// Lamports charged for `amount` tickets, `None` on overflow
pub fn ticket_cost(ticket_price: u64, amount: u64) -> Option<u64> {
    ticket_price.checked_mul(amount)
}
