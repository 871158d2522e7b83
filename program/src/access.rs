use solana_program::pubkey::Pubkey;

use crate::{error::RaffleError, state::AccessControlState};

impl AccessControlState {
    pub fn ensure_owner(&self, caller: &Pubkey) -> Result<(), RaffleError> {
        if *caller != self.owner {
            return Err(RaffleError::Unauthorized);
        }
        Ok(())
    }

    /// Owner or signer.
    pub fn ensure_operator(&self, caller: &Pubkey) -> Result<(), RaffleError> {
        if *caller != self.owner && *caller != self.signer {
            return Err(RaffleError::Unauthorized);
        }
        Ok(())
    }

    pub fn ensure_not_paused(&self) -> Result<(), RaffleError> {
        if self.paused {
            return Err(RaffleError::ContractPaused);
        }
        Ok(())
    }

    pub fn change_owner(&mut self, caller: &Pubkey, new_owner: Pubkey) -> Result<(), RaffleError> {
        self.ensure_owner(caller)?;
        self.owner = new_owner;
        Ok(())
    }

    pub fn change_signer(&mut self, caller: &Pubkey, new_signer: Pubkey) -> Result<(), RaffleError> {
        self.ensure_owner(caller)?;
        self.signer = new_signer;
        Ok(())
    }

    pub fn pause(&mut self, caller: &Pubkey) -> Result<(), RaffleError> {
        self.ensure_owner(caller)?;
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Pubkey) -> Result<(), RaffleError> {
        self.ensure_owner(caller)?;
        self.paused = false;
        Ok(())
    }
}
