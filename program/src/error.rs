use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Caller lacks the role required for this instruction
    #[error("Caller is not authorized for this action")]
    Unauthorized,

    #[error("Contract is paused")]
    ContractPaused,

    /// A raffle with this key already exists
    #[error("Raffle key is already in use")]
    DuplicateRaffle,

    #[error("Raffle not found")]
    RaffleNotFound,

    /// The commitment was already opened, the raffle accepts no more changes
    #[error("Raffle is closed")]
    RaffleClosed,

    #[error("Ticket amount must be greater than zero")]
    InvalidAmount,

    #[error("Payment does not cover the requested tickets")]
    InsufficientPayment,

    /// Preimage does not hash to the stored commitment
    #[error("Randomness opening does not match the commitment")]
    InvalidOpening,

    #[error("Ticket point is outside the sold range")]
    OutOfRange,

    #[error("State account is already initialized")]
    AlreadyInitialized,

    #[error("State account is not initialized")]
    NotInitialized,

    #[error("Arithmetic overflow")]
    Overflow,

    /// Withdrawal would leave the state account below its rent-exempt balance
    #[error("Not enough proceeds to withdraw")]
    InsufficientProceeds,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
