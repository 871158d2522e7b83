use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};

use crate::{
    commitment::Sha256Hasher,
    error::RaffleError,
    instruction::RaffleInstruction,
    registry::RaffleRegistry,
    router::{MessageRouter, Outcome},
    state::{ContractState, Raffle},
    utils::{find_raffle_address, find_state_address, RAFFLE_SEED, STATE_SEED},
};

/// Accounts of the raffle an instruction operates on
struct RaffleAccounts<'a, 'b> {
    key: u64,
    bump_seed: u8,
    raffle_info: &'a AccountInfo<'b>,
    system_program_info: &'a AccountInfo<'b>,
}

/// Program state handler.
pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;
        msg!("Instruction: {}", instruction.name());

        match instruction {
            RaffleInstruction::Initialize { id, ticket_price } => {
                Self::process_initialize(program_id, accounts, id, ticket_price)
            }
            instruction => Self::process_routed(program_id, accounts, instruction),
        }
    }

    /// Creates the state PDA for instance `id` and writes a fresh state owned by the payer.
    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        id: u64,
        ticket_price: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let state_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !owner_info.is_signer {
            msg!("Owner must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let (expected_state, bump_seed) = find_state_address(program_id, id);
        if *state_info.key != expected_state {
            msg!("Invalid state account address");
            return Err(ProgramError::InvalidSeeds);
        }

        if state_info.owner != program_id {
            Self::create_pda_account(
                program_id,
                owner_info,
                state_info,
                system_program_info,
                ContractState::LEN,
                &[STATE_SEED, &id.to_le_bytes(), &[bump_seed]],
            )?;
        } else if ContractState::is_initialized_in(&state_info.data.borrow()) {
            msg!("State account is already initialized");
            return Err(RaffleError::AlreadyInitialized.into());
        }

        let state = ContractState::new(id, *owner_info.key, ticket_price);
        state.save(&mut state_info.data.borrow_mut())?;

        msg!(
            "Initialized instance {}: owner={}, ticket price={} lamports",
            id,
            owner_info.key,
            ticket_price
        );
        Ok(())
    }

    /// Loads the state and the targeted raffle, applies the instruction through
    /// the router, settles lamports and persists both. Nothing is written on error.
    fn process_routed(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction: RaffleInstruction,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let state_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if state_info.owner != program_id {
            msg!("State account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut state = ContractState::load(&state_info.data.borrow())?;
        let (expected_state, _) = find_state_address(program_id, state.id);
        if *state_info.key != expected_state {
            msg!("Invalid state account address");
            return Err(ProgramError::InvalidSeeds);
        }

        let mut registry = RaffleRegistry::default();
        let raffle_accounts = match instruction.raffle_key() {
            Some(key) => {
                let raffle_info = next_account_info(account_info_iter)?;
                let system_program_info = next_account_info(account_info_iter)?;
                if *system_program_info.key != system_program::id() {
                    return Err(ProgramError::IncorrectProgramId);
                }
                let (expected_raffle, bump_seed) =
                    find_raffle_address(program_id, state_info.key, key);
                if *raffle_info.key != expected_raffle {
                    msg!("Invalid raffle account address");
                    return Err(ProgramError::InvalidSeeds);
                }
                if raffle_info.owner == program_id && raffle_info.data_len() > 0 {
                    registry.insert(Raffle::load(&raffle_info.data.borrow())?);
                }
                Some(RaffleAccounts {
                    key,
                    bump_seed,
                    raffle_info,
                    system_program_info,
                })
            }
            None => None,
        };

        let router = MessageRouter::new(Sha256Hasher);
        let outcome = router
            .route(&mut state, &mut registry, caller_info.key, instruction)
            .map_err(|e| {
                msg!("Rejected: {}", e);
                ProgramError::from(e)
            })?;

        match outcome {
            Outcome::Updated => msg!("State updated"),
            Outcome::RaffleCreated { key } => msg!("Raffle {} created", key),
            Outcome::TicketsPurchased {
                raffle_id,
                start,
                amount,
                payment,
            } => {
                let system_program_info = raffle_accounts
                    .as_ref()
                    .map(|accounts| accounts.system_program_info)
                    .ok_or(ProgramError::NotEnoughAccountKeys)?;
                Self::collect_payment(caller_info, state_info, system_program_info, payment)?;
                msg!(
                    "Raffle {}: tickets [{}, {}) sold for {} lamports",
                    raffle_id,
                    start,
                    start + amount,
                    payment
                );
            }
            Outcome::WinnerSelected { raffle_id, winner } => match winner {
                Some(winner) => msg!("Raffle {} winner: {}", raffle_id, winner),
                None => msg!("Raffle {} closed without tickets, no winner", raffle_id),
            },
            Outcome::CounterIncremented { query_id, counter } => {
                msg!("Counter is now {} (query {})", counter, query_id)
            }
            Outcome::ProceedsReleased { amount } => {
                Self::release_proceeds(state_info, caller_info, amount)?;
                msg!("Withdrew {} lamports to {}", amount, caller_info.key);
            }
        }

        if let Some(accounts) = raffle_accounts {
            if let Some(raffle) = registry.get(accounts.key) {
                Self::store_raffle(program_id, caller_info, state_info.key, &accounts, raffle)?;
            }
        }
        state.save(&mut state_info.data.borrow_mut())?;
        Ok(())
    }

    /// Writes `raffle` to its account, creating the account on first use and
    /// growing it as the ticket ledger grows. The payer covers the extra rent.
    fn store_raffle<'a>(
        program_id: &Pubkey,
        payer_info: &AccountInfo<'a>,
        state_key: &Pubkey,
        accounts: &RaffleAccounts<'_, 'a>,
        raffle: &Raffle,
    ) -> ProgramResult {
        let raffle_info = accounts.raffle_info;
        let space = raffle.packed_len()?;

        if raffle_info.owner != program_id {
            Self::create_pda_account(
                program_id,
                payer_info,
                raffle_info,
                accounts.system_program_info,
                space,
                &[
                    RAFFLE_SEED,
                    state_key.as_ref(),
                    &accounts.key.to_le_bytes(),
                    &[accounts.bump_seed],
                ],
            )?;
        } else if space > raffle_info.data_len() {
            let rent = Rent::get()?;
            let shortfall = rent
                .minimum_balance(space)
                .saturating_sub(raffle_info.lamports());
            if shortfall > 0 {
                invoke(
                    &system_instruction::transfer(payer_info.key, raffle_info.key, shortfall),
                    &[
                        payer_info.clone(),
                        raffle_info.clone(),
                        accounts.system_program_info.clone(),
                    ],
                )?;
            }
            raffle_info.realloc(space, false)?;
        }

        raffle.save(&mut raffle_info.data.borrow_mut())
    }

    /// Creates a rent-exempt PDA of `space` bytes owned by this program.
    ///
    /// An address that already holds lamports cannot go through `create_account`,
    /// so it is topped up, allocated and assigned instead.
    fn create_pda_account<'a>(
        program_id: &Pubkey,
        payer_info: &AccountInfo<'a>,
        new_account_info: &AccountInfo<'a>,
        system_program_info: &AccountInfo<'a>,
        space: usize,
        signer_seeds: &[&[u8]],
    ) -> ProgramResult {
        let rent = Rent::get()?;
        let required_lamports = rent.minimum_balance(space);

        if new_account_info.lamports() == 0 {
            return invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    new_account_info.key,
                    required_lamports,
                    space as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    new_account_info.clone(),
                    system_program_info.clone(),
                ],
                &[signer_seeds],
            );
        }

        msg!("Account {} is prefunded, allocating in place", new_account_info.key);
        let shortfall = required_lamports.saturating_sub(new_account_info.lamports());
        if shortfall > 0 {
            invoke(
                &system_instruction::transfer(payer_info.key, new_account_info.key, shortfall),
                &[
                    payer_info.clone(),
                    new_account_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }
        invoke_signed(
            &system_instruction::allocate(new_account_info.key, space as u64),
            &[new_account_info.clone(), system_program_info.clone()],
            &[signer_seeds],
        )?;
        invoke_signed(
            &system_instruction::assign(new_account_info.key, program_id),
            &[new_account_info.clone(), system_program_info.clone()],
            &[signer_seeds],
        )
    }

    /// Moves the ticket payment from the buyer into the state account.
    fn collect_payment<'a>(
        payer_info: &AccountInfo<'a>,
        state_info: &AccountInfo<'a>,
        system_program_info: &AccountInfo<'a>,
        payment: u64,
    ) -> ProgramResult {
        if payment == 0 {
            return Ok(());
        }
        invoke(
            &system_instruction::transfer(payer_info.key, state_info.key, payment),
            &[
                payer_info.clone(),
                state_info.clone(),
                system_program_info.clone(),
            ],
        )
    }

    /// Pays `amount` out of the state account, never below its rent-exempt minimum.
    fn release_proceeds(
        state_info: &AccountInfo,
        recipient_info: &AccountInfo,
        amount: u64,
    ) -> ProgramResult {
        let rent = Rent::get()?;
        let reserved = rent.minimum_balance(state_info.data_len());
        let available = state_info.lamports().saturating_sub(reserved);
        if amount > available {
            msg!(
                "Requested {} lamports but only {} are withdrawable",
                amount,
                available
            );
            return Err(RaffleError::InsufficientProceeds.into());
        }

        let credited = recipient_info
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::Overflow)?;
        **state_info.try_borrow_mut_lamports()? -= amount;
        **recipient_info.try_borrow_mut_lamports()? = credited;
        Ok(())
    }
}
