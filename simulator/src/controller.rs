//! Simulation controller.

use anyhow::{anyhow, bail, Context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use passbook_ledger::{Amount, Bank, FileStore};

use crate::metrics::{OperationKind, SimulationMetrics};
use crate::scenario::{AssertCondition, Scenario, ScenarioStep};

const ACCOUNT_NAMES: [&str; 10] = [
    "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi", "ivan", "judy",
];

/// Workload parameters.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Upper bound of the opening deposit per account.
    pub max_initial_deposit: Amount,
    /// Upper bound of a single generated amount.
    pub max_amount: Amount,
    /// Share of generated amounts that are negative.
    pub negative_ratio: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_initial_deposit: 10_000,
            max_amount: 5_000,
            negative_ratio: 0.05,
        }
    }
}

/// Controls the simulation.
pub struct SimulationController {
    /// Workload parameters.
    config: SimulationConfig,
    /// Random number generator.
    rng: StdRng,
    /// Bank under test.
    bank: Bank,
    /// Store used by reload steps and final saves.
    store: Option<FileStore>,
    /// Simulation metrics.
    metrics: SimulationMetrics,
    /// Outcome of the most recent scenario step: `Err` holds the error code.
    last_outcome: Option<Result<(), &'static str>>,
}

impl SimulationController {
    /// Create a new simulation controller.
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng,
            bank: Bank::new(),
            store: None,
            metrics: SimulationMetrics::new(),
            last_outcome: None,
        }
    }

    /// Attach a store for reloads and saves.
    pub fn with_store(mut self, store: FileStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the bank with the contents of the store, if any.
    pub fn resume(&mut self) -> anyhow::Result<bool> {
        let store = self.store.as_ref().ok_or_else(|| anyhow!("No store configured"))?;
        let restored = self
            .bank
            .restore_from(store)
            .with_context(|| format!("Failed to restore from {}", store.path().display()))?;

        if restored {
            info!(accounts = self.bank.len(), "Resumed bank from disk");
        }
        Ok(restored)
    }

    /// Make sure `account_count` accounts exist, funding any new ones.
    pub fn initialize(&mut self, account_count: usize) -> anyhow::Result<()> {
        info!("Initializing simulation with {} accounts", account_count);

        for i in 0..account_count {
            let name = match ACCOUNT_NAMES.get(i) {
                Some(name) => name.to_string(),
                None => format!("account-{}", i + 1),
            };

            if self.bank.contains(&name) {
                continue;
            }

            let opening = self.rng.gen_range(0..=self.config.max_initial_deposit);
            self.bank.create_account(name.as_str()).deposit(opening)?;
            info!(account = %name, balance = opening, "Opened account");
        }

        Ok(())
    }

    /// Issue `operations` random operations against the bank.
    pub fn run(&mut self, operations: u64) -> anyhow::Result<()> {
        info!("Running {} random operations", operations);

        let names: Vec<String> = self.bank.accounts().map(|a| a.name().to_string()).collect();
        if names.is_empty() {
            bail!("No accounts to operate on");
        }

        for _ in 0..operations {
            let amount = self.random_amount();
            let first = &names[self.rng.gen_range(0..names.len())];

            let (kind, result) = match self.rng.gen_range(0..3) {
                0 => (OperationKind::Deposit, self.bank.deposit(first, amount).map(drop)),
                1 => (OperationKind::Withdraw, self.bank.withdraw(first, amount).map(drop)),
                _ => {
                    let second = &names[self.rng.gen_range(0..names.len())];
                    let result = self.bank.transfer(first, second, amount).map(drop);
                    (OperationKind::Transfer, result)
                }
            };

            self.record(kind, result)?;
        }

        self.bank
            .verify_integrity()
            .context("Integrity check failed after workload")?;

        Ok(())
    }

    /// Run a scenario, failing on the first unmet assertion.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<()> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        for (index, step) in scenario.steps.iter().enumerate() {
            self.execute_step(step)
                .with_context(|| format!("Step {} of scenario {} failed", index + 1, scenario.name))?;
        }

        self.bank.verify_integrity()?;
        Ok(())
    }

    /// Persist the bank to the configured store.
    pub fn save(&self) -> anyhow::Result<()> {
        let store = self.store.as_ref().ok_or_else(|| anyhow!("No store configured"))?;
        self.bank
            .save_to(store)
            .with_context(|| format!("Failed to save to {}", store.path().display()))
    }

    /// Restore a fresh bank from the store and swap it in if it matches
    /// the one in memory. On any failure the current bank is kept.
    fn reload(&mut self) -> anyhow::Result<()> {
        let store = self.store.as_ref().ok_or_else(|| anyhow!("No store configured"))?;
        let mut reloaded = Bank::new();
        let found = reloaded
            .restore_from(store)
            .with_context(|| format!("Failed to reload from {}", store.path().display()))?;

        if !found {
            bail!("Saved bank was not found on reload");
        }
        if reloaded != self.bank {
            bail!("Reloaded bank differs from the saved one");
        }

        self.bank = reloaded;
        Ok(())
    }

    /// Bank under test.
    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Get simulation metrics.
    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::Open { account } => {
                self.bank.create_account(account.as_str());
                self.last_outcome = Some(Ok(()));
            }
            ScenarioStep::Deposit { account, amount } => {
                let result = self.bank.deposit(account, *amount).map(drop);
                self.record_step(OperationKind::Deposit, result)?;
            }
            ScenarioStep::Withdraw { account, amount } => {
                let result = self.bank.withdraw(account, *amount).map(drop);
                self.record_step(OperationKind::Withdraw, result)?;
            }
            ScenarioStep::Transfer { from, to, amount } => {
                let result = self.bank.transfer(from, to, *amount).map(drop);
                self.record_step(OperationKind::Transfer, result)?;
            }
            ScenarioStep::Lookup { account } => {
                let result = self.bank.get_account(account).map(drop);
                self.last_outcome = Some(result.map_err(|e| e.error_code()));
            }
            ScenarioStep::Reload => {
                self.save()?;
                self.reload()?;
                self.last_outcome = Some(Ok(()));
            }
            ScenarioStep::Assert { condition } => self.check(condition)?,
        }

        Ok(())
    }

    fn check(&self, condition: &AssertCondition) -> anyhow::Result<()> {
        debug!(?condition, "Checking condition");

        match condition {
            AssertCondition::LastSucceeded => match self.last_outcome {
                Some(Ok(())) => Ok(()),
                Some(Err(code)) => bail!("Expected success, got {}", code),
                None => bail!("No operation to check"),
            },
            AssertCondition::LastFailedWith { code } => match self.last_outcome {
                Some(Err(actual)) if actual == code.as_str() => Ok(()),
                Some(Err(actual)) => bail!("Expected {}, got {}", code, actual),
                Some(Ok(())) => bail!("Expected {}, got success", code),
                None => bail!("No operation to check"),
            },
            AssertCondition::BalanceEquals { account, amount } => {
                let balance = self.bank.get_account(account)?.balance();
                if balance != *amount {
                    bail!("Balance of {} is {}, expected {}", account, balance, amount);
                }
                Ok(())
            }
            AssertCondition::HistoryLength { account, entries } => {
                let actual = self.bank.get_account(account)?.history().len();
                if actual != *entries {
                    bail!("History of {} has {} entries, expected {}", account, actual, entries);
                }
                Ok(())
            }
        }
    }

    fn record_step(
        &mut self,
        kind: OperationKind,
        result: passbook_ledger::Result<()>,
    ) -> anyhow::Result<()> {
        self.last_outcome = Some(result.as_ref().map(|_| ()).map_err(|e| e.error_code()));
        self.record(kind, result)
    }

    /// Count the outcome; only non-rejection errors abort the run.
    fn record(
        &mut self,
        kind: OperationKind,
        result: passbook_ledger::Result<()>,
    ) -> anyhow::Result<()> {
        match result {
            Ok(()) => self.metrics.record_success(kind),
            Err(e) if e.is_rejection() => {
                debug!(?kind, code = e.error_code(), "Operation rejected");
                self.metrics.record_rejection(e.error_code());
            }
            Err(e) => {
                warn!(?kind, error = %e, "Operation failed");
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn random_amount(&mut self) -> Amount {
        let amount = self.rng.gen_range(0..=self.config.max_amount);
        if self.rng.gen_bool(self.config.negative_ratio) {
            -amount.max(1)
        } else {
            amount
        }
    }
}
