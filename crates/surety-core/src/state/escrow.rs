//! Insurance escrow: policies bought against registered flights, credited
//! when their flight resolves to a LATE_* status, and paid out on withdrawal.
//!
//! Withdrawal debits internal state (policies marked PAID, balance zeroed,
//! treasury reduced) before any funds leave the ledger.

use std::collections::BTreeMap;

use crate::config::LedgerConfig;
use crate::errors::{SuretyError, SuretyResult};
use crate::events::LedgerEvent;
use crate::state::{FlightRegistry, OperationalGate, Treasury};
use crate::types::{AccountId, Amount, FlightKey, PolicyId, PolicyState, StatusCode};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct InsurancePolicy {
    pub id: PolicyId,
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub amount_paid: Amount,
    pub state: PolicyState,
    pub credit_owed: Amount,
}

/// Credits computed ahead of a status write
#[derive(Debug, Default)]
pub(crate) struct CreditPlan {
    credits: Vec<(PolicyId, Amount)>,
    balances: BTreeMap<AccountId, Amount>,
}

/// What one withdrawal debited
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settlement {
    pub passenger: AccountId,
    pub amount: Amount,
    /// Policies this withdrawal moved from CREDITED to PAID
    pub policies: Vec<PolicyId>,
}

#[derive(Debug, Clone)]
pub struct InsuranceEscrow {
    policies: BTreeMap<PolicyId, InsurancePolicy>,
    by_flight: BTreeMap<FlightKey, Vec<PolicyId>>,
    by_passenger: BTreeMap<AccountId, Vec<PolicyId>>,
    /// Sum of `credit_owed` over each passenger's CREDITED policies
    credit_balances: BTreeMap<AccountId, Amount>,
    next_id: u64,
    config: LedgerConfig,
}

impl InsuranceEscrow {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            policies: BTreeMap::new(),
            by_flight: BTreeMap::new(),
            by_passenger: BTreeMap::new(),
            credit_balances: BTreeMap::new(),
            next_id: 1,
            config: config.clone(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn buy(
        &mut self,
        gate: &OperationalGate,
        flights: &FlightRegistry,
        treasury: &mut Treasury,
        passenger: AccountId,
        flight_key: FlightKey,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<PolicyId> {
        gate.ensure_operational()?;

        let flight = flights.get(&flight_key)?;

        if amount == 0 {
            return Err(SuretyError::ZeroAmount);
        }

        if amount > self.config.max_insurance {
            return Err(SuretyError::CapExceeded);
        }

        if flight.status.is_resolved() {
            return Err(SuretyError::FlightAlreadyResolved);
        }

        treasury.deposit_premium(amount)?;

        let id = PolicyId(self.next_id);
        self.next_id += 1;
        self.policies.insert(
            id,
            InsurancePolicy {
                id,
                passenger,
                flight: flight_key,
                amount_paid: amount,
                state: PolicyState::Active,
                credit_owed: 0,
            },
        );
        self.by_flight.entry(flight_key).or_default().push(id);
        self.by_passenger.entry(passenger).or_default().push(id);

        events.push(LedgerEvent::InsurancePurchased {
            policy: id,
            passenger,
            flight: flight_key,
            amount,
        });
        log::debug!(
            "{} bought by {:?} on flight {}: {}",
            id,
            passenger,
            flight.flight_number,
            amount
        );

        Ok(id)
    }

    pub fn policy(&self, id: PolicyId) -> SuretyResult<&InsurancePolicy> {
        self.policies.get(&id).ok_or(SuretyError::NotFound)
    }

    pub fn policies_of(&self, passenger: &AccountId) -> Vec<&InsurancePolicy> {
        self.by_passenger
            .get(passenger)
            .map(|ids| ids.iter().filter_map(|id| self.policies.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn policies_for_flight(&self, flight: &FlightKey) -> Vec<&InsurancePolicy> {
        self.by_flight
            .get(flight)
            .map(|ids| ids.iter().filter_map(|id| self.policies.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn credit_balance(&self, passenger: &AccountId) -> Amount {
        self.credit_balances.get(passenger).copied().unwrap_or(0)
    }

    /// Passengers with a non-zero credit balance
    pub fn creditors(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.credit_balances.iter()
    }

    /// Credits for every ACTIVE policy on the flight if `status` is LATE_*.
    /// Fails on overflow without touching anything.
    pub(crate) fn prepare_credits(
        &self,
        flight: &FlightKey,
        status: StatusCode,
    ) -> SuretyResult<CreditPlan> {
        let mut plan = CreditPlan::default();
        if !status.is_late() {
            return Ok(plan);
        }

        for policy in self.policies_for_flight(flight) {
            if policy.state != PolicyState::Active {
                continue;
            }

            let credit = self.config.credit_for(policy.amount_paid)?;
            let balance = match plan.balances.get(&policy.passenger) {
                Some(balance) => *balance,
                None => self.credit_balance(&policy.passenger),
            };
            let balance = balance
                .checked_add(credit)
                .ok_or(SuretyError::MathOverflow)?;

            plan.balances.insert(policy.passenger, balance);
            plan.credits.push((policy.id, credit));
        }

        Ok(plan)
    }

    pub(crate) fn apply_credits(&mut self, plan: CreditPlan, events: &mut Vec<LedgerEvent>) {
        for (id, credit) in plan.credits {
            if let Some(policy) = self.policies.get_mut(&id) {
                policy.state = PolicyState::Credited;
                policy.credit_owed = credit;
                events.push(LedgerEvent::PolicyCredited {
                    policy: id,
                    passenger: policy.passenger,
                    credit,
                });
                log::debug!("{} credited {} to {:?}", id, credit, policy.passenger);
            }
        }
        self.credit_balances.extend(plan.balances);
    }

    /// Debit the passenger's whole credit balance ahead of the external
    /// transfer: policies become PAID, the balance is zeroed, and the
    /// treasury releases the funds.
    pub(crate) fn settle_withdrawal(
        &mut self,
        gate: &OperationalGate,
        treasury: &mut Treasury,
        passenger: AccountId,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<Settlement> {
        gate.ensure_operational()?;

        let amount = self.credit_balance(&passenger);
        if amount == 0 {
            return Err(SuretyError::NothingOwed);
        }

        treasury.pay_out(amount)?;
        self.credit_balances.remove(&passenger);

        let mut paid = Vec::new();
        if let Some(ids) = self.by_passenger.get(&passenger) {
            for id in ids {
                if let Some(policy) = self.policies.get_mut(id) {
                    if policy.state == PolicyState::Credited {
                        policy.state = PolicyState::Paid;
                        paid.push(*id);
                    }
                }
            }
        }

        events.push(LedgerEvent::CreditWithdrawn { passenger, amount });
        log::info!("Withdrawal of {} settled for {:?}", amount, passenger);

        Ok(Settlement {
            passenger,
            amount,
            policies: paid,
        })
    }

    /// Undo exactly one settlement whose transfer failed. Whatever was
    /// committed after it, including other withdrawals, stays in place.
    pub(crate) fn revert_withdrawal(
        &mut self,
        treasury: &mut Treasury,
        settlement: &Settlement,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<()> {
        let Settlement {
            passenger,
            amount,
            policies,
        } = settlement;

        let balance = self
            .credit_balance(passenger)
            .checked_add(*amount)
            .ok_or(SuretyError::MathOverflow)?;
        treasury.reverse_payout(*amount)?;
        self.credit_balances.insert(*passenger, balance);

        for id in policies {
            if let Some(policy) = self.policies.get_mut(id) {
                policy.state = PolicyState::Credited;
            }
        }

        events.push(LedgerEvent::WithdrawalReverted {
            passenger: *passenger,
            amount: *amount,
        });
        log::debug!("Withdrawal of {} reverted for {:?}", amount, passenger);

        Ok(())
    }
}
