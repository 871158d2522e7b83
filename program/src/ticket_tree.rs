//! Ticket ledger: contiguous ranges of ticket positions mapped to owners.
//!
//! Ranges are only ever appended at the cursor, so their start indexes are
//! strictly increasing and together they partition `[0, cursor)`. That makes
//! point resolution a single binary search over the range starts, which keeps
//! winner selection logarithmic in the number of purchases no matter how many
//! tickets a single participant buys.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::RaffleError;

/// Half-open range `[start, end)` of ticket positions held by `owner`
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicketRange {
    pub start: u64,
    pub end: u64,
    pub owner: Pubkey,
}

impl TicketRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, point: u64) -> bool {
        self.start <= point && point < self.end
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketIntervalTree {
    ranges: Vec<TicketRange>,
    cursor: u64,
}

impl TicketIntervalTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `[cursor, cursor + amount)` for `account` and advances the cursor.
    pub fn append(&mut self, account: Pubkey, amount: u64) -> Result<(), RaffleError> {
        if amount == 0 {
            return Err(RaffleError::InvalidAmount);
        }
        let end = self
            .cursor
            .checked_add(amount)
            .ok_or(RaffleError::Overflow)?;

        self.ranges.push(TicketRange {
            start: self.cursor,
            end,
            owner: account,
        });
        self.cursor = end;
        Ok(())
    }

    /// Returns the owner of the range containing `point`.
    pub fn point_query(&self, point: u64) -> Result<Pubkey, RaffleError> {
        if point >= self.cursor {
            return Err(RaffleError::OutOfRange);
        }
        // Index of the first range starting after `point`; the one before it holds `point`.
        let idx = self.ranges.partition_point(|range| range.start <= point);
        self.ranges
            .get(idx.wrapping_sub(1))
            .filter(|range| range.contains(point))
            .map(|range| range.owner)
            .ok_or(RaffleError::OutOfRange)
    }

    /// Next unsold ticket position, equal to the total number of tickets sold.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn ranges(&self) -> &[TicketRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Sum of range lengths owned by `account`.
    #[cfg(test)]
    pub fn tickets_of(&self, account: &Pubkey) -> u64 {
        self.ranges
            .iter()
            .filter(|range| range.owner == *account)
            .map(TicketRange::len)
            .sum()
    }
}
