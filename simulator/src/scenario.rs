//! Simulation scenarios.

use serde::{Deserialize, Serialize};

/// A simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Create (or replace) an account.
    Open { account: String },
    /// Deposit into an account.
    Deposit { account: String, amount: i64 },
    /// Withdraw from an account.
    Withdraw { account: String, amount: i64 },
    /// Transfer between accounts.
    Transfer { from: String, to: String, amount: i64 },
    /// Look an account up without touching it.
    Lookup { account: String },
    /// Save the bank and restore it into a fresh one.
    Reload,
    /// Assert a condition.
    Assert { condition: AssertCondition },
}

/// Conditions that can be asserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssertCondition {
    /// The previous step succeeded.
    LastSucceeded,
    /// The previous step failed with this error code.
    LastFailedWith { code: String },
    /// Account balance equals.
    BalanceEquals { account: String, amount: i64 },
    /// Account history has this many entries.
    HistoryLength { account: String, entries: usize },
}

impl Scenario {
    /// Names of the built-in scenarios.
    pub const NAMES: [&'static str; 3] = ["basic", "overdraft", "round-trip"];

    /// Load a scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "basic" => Ok(Self::basic()),
            "overdraft" => Ok(Self::overdraft()),
            "round-trip" => Ok(Self::round_trip()),
            _ => Err(anyhow::anyhow!(
                "Unknown scenario: {} (available: {})",
                name,
                Self::NAMES.join(", ")
            )),
        }
    }

    /// Single account: deposit, rejected overdraft, rejected negative deposit.
    fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            description: "Deposit, overdraft and negative amount on one account".to_string(),
            steps: vec![
                open("A"),
                deposit("A", 100),
                ScenarioStep::Assert {
                    condition: AssertCondition::LastSucceeded,
                },
                balance_equals("A", 100),
                history_length("A", 1),
                ScenarioStep::Withdraw {
                    account: "A".to_string(),
                    amount: 150,
                },
                failed_with("INSUFFICIENT_FUNDS"),
                balance_equals("A", 100),
                deposit("A", -5),
                failed_with("INVALID_AMOUNT"),
                balance_equals("A", 100),
                history_length("A", 1),
                ScenarioStep::Lookup {
                    account: "never-created".to_string(),
                },
                failed_with("ACCOUNT_NOT_FOUND"),
            ],
        }
    }

    /// Two accounts: drain one into the other, then overdraw.
    fn overdraft() -> Self {
        Self {
            name: "overdraft".to_string(),
            description: "Transfer a full balance, then attempt it again".to_string(),
            steps: vec![
                open("A"),
                open("B"),
                deposit("A", 200),
                transfer("A", "B", 200),
                ScenarioStep::Assert {
                    condition: AssertCondition::LastSucceeded,
                },
                balance_equals("A", 0),
                balance_equals("B", 200),
                transfer("A", "B", 200),
                failed_with("INSUFFICIENT_FUNDS"),
                balance_equals("A", 0),
                balance_equals("B", 200),
            ],
        }
    }

    /// Persist a bank with history and check it comes back identical.
    fn round_trip() -> Self {
        Self {
            name: "round-trip".to_string(),
            description: "Save the bank to disk and restore it".to_string(),
            steps: vec![
                open("A"),
                open("B"),
                deposit("A", 500),
                transfer("A", "B", 120),
                transfer("B", "B", 20),
                ScenarioStep::Reload,
                ScenarioStep::Assert {
                    condition: AssertCondition::LastSucceeded,
                },
                balance_equals("A", 380),
                balance_equals("B", 120),
                history_length("A", 2),
                history_length("B", 3),
            ],
        }
    }
}

fn open(account: &str) -> ScenarioStep {
    ScenarioStep::Open {
        account: account.to_string(),
    }
}

fn deposit(account: &str, amount: i64) -> ScenarioStep {
    ScenarioStep::Deposit {
        account: account.to_string(),
        amount,
    }
}

fn transfer(from: &str, to: &str, amount: i64) -> ScenarioStep {
    ScenarioStep::Transfer {
        from: from.to_string(),
        to: to.to_string(),
        amount,
    }
}

fn failed_with(code: &str) -> ScenarioStep {
    ScenarioStep::Assert {
        condition: AssertCondition::LastFailedWith {
            code: code.to_string(),
        },
    }
}

fn balance_equals(account: &str, amount: i64) -> ScenarioStep {
    ScenarioStep::Assert {
        condition: AssertCondition::BalanceEquals {
            account: account.to_string(),
            amount,
        },
    }
}

fn history_length(account: &str, entries: usize) -> ScenarioStep {
    ScenarioStep::Assert {
        condition: AssertCondition::HistoryLength {
            account: account.to_string(),
            entries,
        },
    }
}
