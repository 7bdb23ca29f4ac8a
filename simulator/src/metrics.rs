//! Simulation metrics.

use std::collections::BTreeMap;

use serde::Serialize;

/// Kind of operation the simulator issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Transfer,
}

/// Simulation metrics.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationMetrics {
    /// Total operations attempted.
    pub total_operations: u64,
    /// Operations that changed the bank.
    pub successful_operations: u64,
    /// Operations rejected without effect.
    pub rejected_operations: u64,
    /// Successful deposits.
    pub deposits: u64,
    /// Successful withdrawals.
    pub withdrawals: u64,
    /// Successful transfers.
    pub transfers: u64,
    /// Rejections by error code.
    pub rejections_by_code: BTreeMap<&'static str, u64>,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            total_operations: 0,
            successful_operations: 0,
            rejected_operations: 0,
            deposits: 0,
            withdrawals: 0,
            transfers: 0,
            rejections_by_code: BTreeMap::new(),
        }
    }

    /// Record a successful operation.
    pub fn record_success(&mut self, kind: OperationKind) {
        self.total_operations += 1;
        self.successful_operations += 1;

        match kind {
            OperationKind::Deposit => self.deposits += 1,
            OperationKind::Withdraw => self.withdrawals += 1,
            OperationKind::Transfer => self.transfers += 1,
        }
    }

    /// Record a rejected operation.
    pub fn record_rejection(&mut self, code: &'static str) {
        self.total_operations += 1;
        self.rejected_operations += 1;
        *self.rejections_by_code.entry(code).or_insert(0) += 1;
    }

    /// Get success rate.
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }

        self.successful_operations as f64 / self.total_operations as f64
    }
}

impl Default for SimulationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let mut metrics = SimulationMetrics::new();

        metrics.record_success(OperationKind::Deposit);
        metrics.record_success(OperationKind::Transfer);
        metrics.record_success(OperationKind::Transfer);
        metrics.record_rejection("INSUFFICIENT_FUNDS");

        assert_eq!(metrics.total_operations, 4);
        assert_eq!(metrics.successful_operations, 3);
        assert_eq!(metrics.rejected_operations, 1);
        assert_eq!(metrics.transfers, 2);
        assert_eq!(metrics.rejections_by_code["INSUFFICIENT_FUNDS"], 1);
        assert_eq!(metrics.success_rate(), 0.75);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = SimulationMetrics::default();
        assert_eq!(metrics.success_rate(), 0.0);
    }
}
