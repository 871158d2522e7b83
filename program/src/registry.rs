//! Raffle records and their lifecycle.
//!
//! Each raffle lives in its own account, so the registry an instruction works
//! on holds only the records whose accounts were passed in. Growth of one
//! raffle never touches the storage of another.

use std::collections::BTreeMap;

use solana_program::pubkey::Pubkey;

use crate::{
    commitment::{derive_randomness, verify_opening, CommitmentHasher},
    error::RaffleError,
    state::{AccessControlState, Raffle},
    utils::ticket_cost,
    winner,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RaffleRegistry {
    raffles: BTreeMap<u64, Raffle>,
}

impl RaffleRegistry {
    /// Makes a stored raffle visible to the handlers.
    pub fn insert(&mut self, raffle: Raffle) {
        self.raffles.insert(raffle.id, raffle);
    }

    /// Registers a new raffle under `key`. Keys are never reused, even once a
    /// raffle has concluded.
    pub fn create(
        &mut self,
        access: &AccessControlState,
        caller: &Pubkey,
        key: u64,
        commitment: [u8; 32],
    ) -> Result<&Raffle, RaffleError> {
        access.ensure_not_paused()?;
        access.ensure_operator(caller)?;
        if self.raffles.contains_key(&key) {
            return Err(RaffleError::DuplicateRaffle);
        }
        Ok(&*self
            .raffles
            .entry(key)
            .or_insert_with(|| Raffle::new(key, commitment)))
    }

    /// Credits `amount` tickets to `account`. Returns the first ticket index
    /// of the new range.
    pub fn purchase_tickets(
        &mut self,
        access: &AccessControlState,
        ticket_price: u64,
        raffle_id: u64,
        account: Pubkey,
        amount: u64,
        payment: u64,
    ) -> Result<u64, RaffleError> {
        access.ensure_not_paused()?;
        let raffle = self
            .raffles
            .get_mut(&raffle_id)
            .ok_or(RaffleError::RaffleNotFound)?;
        if raffle.opened {
            return Err(RaffleError::RaffleClosed);
        }
        if amount == 0 {
            return Err(RaffleError::InvalidAmount);
        }
        let cost = ticket_cost(ticket_price, amount).ok_or(RaffleError::Overflow)?;
        if payment < cost {
            return Err(RaffleError::InsufficientPayment);
        }
        let new_total = raffle
            .total_tickets
            .checked_add(amount)
            .ok_or(RaffleError::Overflow)?;
        let new_account_total = raffle
            .player_amount(&account)
            .checked_add(amount)
            .ok_or(RaffleError::Overflow)?;

        let start = raffle.ticket_ledger.cursor();
        raffle.ticket_ledger.append(account, amount)?;
        raffle.total_tickets = new_total;
        raffle.per_account_totals.insert(account, new_account_total);
        Ok(start)
    }

    /// Opens the commitment of `raffle_id` with `preimage` and draws the winner.
    ///
    /// Nothing changes unless the preimage hashes to the stored commitment.
    pub fn reveal_and_select_winner<H: CommitmentHasher>(
        &mut self,
        access: &AccessControlState,
        hasher: &H,
        caller: &Pubkey,
        raffle_id: u64,
        preimage: &[u8],
    ) -> Result<Option<Pubkey>, RaffleError> {
        access.ensure_operator(caller)?;
        let raffle = self
            .raffles
            .get_mut(&raffle_id)
            .ok_or(RaffleError::RaffleNotFound)?;
        if raffle.opened {
            return Err(RaffleError::RaffleClosed);
        }
        if !verify_opening(hasher, &raffle.commitment, preimage) {
            return Err(RaffleError::InvalidOpening);
        }

        let randomness = derive_randomness(hasher, preimage);
        let winner = winner::select(&randomness, raffle.total_tickets, &raffle.ticket_ledger)?;

        raffle.revealed_randomness = Some(randomness);
        raffle.opened = true;
        raffle.winner = winner;
        Ok(winner)
    }

    pub fn get(&self, id: u64) -> Option<&Raffle> {
        self.raffles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.raffles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raffles.is_empty()
    }

    pub fn player_amount(&self, id: u64, account: &Pubkey) -> u64 {
        self.get(id)
            .map(|raffle| raffle.player_amount(account))
            .unwrap_or(0)
    }

    pub fn total_sum(&self, id: u64) -> Option<u64> {
        self.get(id).map(|raffle| raffle.total_tickets)
    }

    pub fn winner(&self, id: u64) -> Option<Pubkey> {
        self.get(id).and_then(|raffle| raffle.winner)
    }

    pub fn commitment_opened(&self, id: u64) -> Option<bool> {
        self.get(id).map(|raffle| raffle.opened)
    }

    pub fn current_randomness(&self, id: u64) -> Option<[u8; 32]> {
        self.get(id).map(Raffle::current_randomness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::Sha256Hasher;

    const PRICE: u64 = 10;

    struct Fixture {
        registry: RaffleRegistry,
        access: AccessControlState,
        owner: Pubkey,
        player1: Pubkey,
        player2: Pubkey,
    }

    fn fixture() -> Fixture {
        let owner = Pubkey::new_unique();
        Fixture {
            registry: RaffleRegistry::default(),
            access: AccessControlState {
                owner,
                signer: owner,
                paused: false,
            },
            owner,
            player1: Pubkey::new_unique(),
            player2: Pubkey::new_unique(),
        }
    }

    fn commitment(preimage: &[u8]) -> [u8; 32] {
        Sha256Hasher.hash(preimage)
    }

    /// Raffle 0 committed to "test" with player1 holding 1 ticket and player2 holding 14.
    fn funded(f: &mut Fixture) {
        f.registry
            .create(&f.access, &f.owner, 0, commitment(b"test"))
            .unwrap();
        f.registry
            .purchase_tickets(&f.access, PRICE, 0, f.player1, 1, PRICE)
            .unwrap();
        f.registry
            .purchase_tickets(&f.access, PRICE, 0, f.player2, 14, 14 * PRICE)
            .unwrap();
    }

    #[test]
    fn create_stores_commitment() {
        let mut f = fixture();
        let raffle = f
            .registry
            .create(&f.access, &f.owner, 0, commitment(b"test"))
            .unwrap()
            .clone();

        assert_eq!(raffle.commitment, commitment(b"test"));
        assert!(!raffle.opened);
        assert_eq!(raffle.total_tickets, 0);
        assert!(raffle.ticket_ledger.is_empty());
        assert_eq!(f.registry.current_randomness(0), Some(commitment(b"test")));
        assert_eq!(f.registry.commitment_opened(0), Some(false));
    }

    #[test]
    fn create_requires_operator_and_unpaused() {
        let mut f = fixture();
        assert_eq!(
            f.registry
                .create(&f.access, &f.player1, 0, commitment(b"test"))
                .map(|_| ()),
            Err(RaffleError::Unauthorized)
        );

        f.access.paused = true;
        assert_eq!(
            f.registry
                .create(&f.access, &f.owner, 0, commitment(b"test"))
                .map(|_| ()),
            Err(RaffleError::ContractPaused)
        );
        assert!(f.registry.is_empty());
    }

    #[test]
    fn signer_may_create_raffles() {
        let mut f = fixture();
        let signer = Pubkey::new_unique();
        f.access.signer = signer;
        assert!(f
            .registry
            .create(&f.access, &signer, 3, commitment(b"x"))
            .is_ok());
    }

    #[test]
    fn keys_are_never_reused() {
        let mut f = fixture();
        funded(&mut f);
        assert_eq!(
            f.registry
                .create(&f.access, &f.owner, 0, commitment(b"other"))
                .map(|_| ()),
            Err(RaffleError::DuplicateRaffle)
        );

        f.registry
            .reveal_and_select_winner(&f.access, &Sha256Hasher, &f.owner, 0, b"test")
            .unwrap();
        assert_eq!(
            f.registry
                .create(&f.access, &f.owner, 0, commitment(b"other"))
                .map(|_| ()),
            Err(RaffleError::DuplicateRaffle)
        );
        assert_eq!(f.registry.get(0).unwrap().commitment, commitment(b"test"));
    }

    #[test]
    fn purchases_build_contiguous_ranges() {
        let mut f = fixture();
        funded(&mut f);
        let raffle = f.registry.get(0).unwrap();

        assert_eq!(raffle.total_tickets, 15);
        assert_eq!(f.registry.total_sum(0), Some(15));
        assert_eq!(f.registry.player_amount(0, &f.player1), 1);
        assert_eq!(f.registry.player_amount(0, &f.player2), 14);
        assert_eq!(f.registry.player_amount(0, &f.owner), 0);
        assert_eq!(f.registry.player_amount(9, &f.player1), 0);

        let ranges = raffle.ticket_ledger.ranges();
        assert_eq!((ranges[0].start, ranges[0].end, ranges[0].owner), (0, 1, f.player1));
        assert_eq!((ranges[1].start, ranges[1].end, ranges[1].owner), (1, 15, f.player2));
    }

    #[test]
    fn per_account_totals_match_ledger() {
        let mut f = fixture();
        f.registry
            .create(&f.access, &f.owner, 1, commitment(b"seed"))
            .unwrap();
        let buys = [(f.player1, 3), (f.player2, 5), (f.player1, 2), (f.player2, 1)];
        for (account, amount) in buys {
            let start = f
                .registry
                .purchase_tickets(&f.access, PRICE, 1, account, amount, amount * PRICE)
                .unwrap();
            assert_eq!(start + amount, f.registry.total_sum(1).unwrap());
        }

        let raffle = f.registry.get(1).unwrap();
        for (account, total) in &raffle.per_account_totals {
            assert_eq!(*total, raffle.ticket_ledger.tickets_of(account));
        }
        assert_eq!(raffle.total_tickets, raffle.ticket_ledger.cursor());
    }

    #[test]
    fn purchase_validation_leaves_state_untouched() {
        let mut f = fixture();
        funded(&mut f);
        let before = f.registry.clone();

        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 5, f.player1, 1, PRICE),
            Err(RaffleError::RaffleNotFound)
        );
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 0, f.player1, 0, PRICE),
            Err(RaffleError::InvalidAmount)
        );
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 0, f.player1, 2, 2 * PRICE - 1),
            Err(RaffleError::InsufficientPayment)
        );
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, u64::MAX, 0, f.player1, 2, u64::MAX),
            Err(RaffleError::Overflow)
        );

        f.access.paused = true;
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 0, f.player1, 1, PRICE),
            Err(RaffleError::ContractPaused)
        );
        assert_eq!(f.registry, before);
    }

    #[test]
    fn overpayment_is_accepted() {
        let mut f = fixture();
        f.registry
            .create(&f.access, &f.owner, 0, commitment(b"test"))
            .unwrap();
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 0, f.player1, 1, PRICE * 3),
            Ok(0)
        );
    }

    #[test]
    fn wrong_opening_changes_nothing() {
        let mut f = fixture();
        funded(&mut f);
        let before = f.registry.clone();

        assert_eq!(
            f.registry.reveal_and_select_winner(
                &f.access,
                &Sha256Hasher,
                &f.owner,
                0,
                b"wrong input"
            ),
            Err(RaffleError::InvalidOpening)
        );
        assert_eq!(f.registry, before);
        assert_eq!(f.registry.winner(0), None);
        assert_eq!(f.registry.commitment_opened(0), Some(false));
    }

    #[test]
    fn reveal_requires_operator() {
        let mut f = fixture();
        funded(&mut f);
        assert_eq!(
            f.registry.reveal_and_select_winner(
                &f.access,
                &Sha256Hasher,
                &f.player1,
                0,
                b"test"
            ),
            Err(RaffleError::Unauthorized)
        );
        assert_eq!(
            f.registry.reveal_and_select_winner(
                &f.access,
                &Sha256Hasher,
                &f.owner,
                42,
                b"test"
            ),
            Err(RaffleError::RaffleNotFound)
        );
    }

    #[test]
    fn reveal_closes_raffle_and_picks_a_ticket_holder() {
        let mut f = fixture();
        funded(&mut f);

        let winner = f
            .registry
            .reveal_and_select_winner(&f.access, &Sha256Hasher, &f.owner, 0, b"test")
            .unwrap()
            .expect("tickets were sold");

        assert!(winner == f.player1 || winner == f.player2);
        assert_eq!(f.registry.winner(0), Some(winner));
        assert_eq!(f.registry.commitment_opened(0), Some(true));
        assert_eq!(
            f.registry.current_randomness(0),
            Some(derive_randomness(&Sha256Hasher, b"test"))
        );

        let closed = f.registry.clone();
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 0, f.player1, 1, PRICE),
            Err(RaffleError::RaffleClosed)
        );
        assert_eq!(
            f.registry
                .reveal_and_select_winner(&f.access, &Sha256Hasher, &f.owner, 0, b"test"),
            Err(RaffleError::RaffleClosed)
        );
        assert_eq!(f.registry, closed);
    }

    #[test]
    fn winner_is_deterministic_across_runs() {
        let winners: Vec<_> = (0..5)
            .map(|_| {
                let mut f = fixture();
                // fixed accounts so every run sees the same distribution
                f.player1 = Pubkey::new_from_array([1u8; 32]);
                f.player2 = Pubkey::new_from_array([2u8; 32]);
                funded(&mut f);
                f.registry
                    .reveal_and_select_winner(&f.access, &Sha256Hasher, &f.owner, 0, b"test")
                    .unwrap()
            })
            .collect();
        assert!(winners.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn reveal_without_tickets_closes_with_no_winner() {
        let mut f = fixture();
        f.registry
            .create(&f.access, &f.owner, 0, commitment(b"test"))
            .unwrap();
        assert_eq!(
            f.registry
                .reveal_and_select_winner(&f.access, &Sha256Hasher, &f.owner, 0, b"test"),
            Ok(None)
        );
        assert_eq!(f.registry.commitment_opened(0), Some(true));
        assert_eq!(f.registry.winner(0), None);
    }

    #[test]
    fn raffles_are_independent() {
        let mut f = fixture();
        funded(&mut f);
        f.registry
            .create(&f.access, &f.owner, 1, commitment(b"other"))
            .unwrap();
        f.registry
            .reveal_and_select_winner(&f.access, &Sha256Hasher, &f.owner, 0, b"test")
            .unwrap();

        assert_eq!(f.registry.commitment_opened(1), Some(false));
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 1, f.player1, 4, 4 * PRICE),
            Ok(0)
        );
        assert_eq!(f.registry.total_sum(0), Some(15));
        assert_eq!(f.registry.len(), 2);
    }

    #[test]
    fn inserted_raffle_blocks_its_key() {
        let mut f = fixture();
        f.registry.insert(Raffle::new(4, commitment(b"stored")));

        assert_eq!(
            f.registry
                .create(&f.access, &f.owner, 4, commitment(b"again"))
                .map(|_| ()),
            Err(RaffleError::DuplicateRaffle)
        );
        assert_eq!(
            f.registry
                .purchase_tickets(&f.access, PRICE, 4, f.player1, 1, PRICE),
            Ok(0)
        );
    }
}
