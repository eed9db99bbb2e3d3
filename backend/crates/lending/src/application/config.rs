//! Application Configuration
//!
//! Configuration for the Lending application layer.

use chrono::Duration;

/// Lending application configuration
#[derive(Debug, Clone)]
pub struct LendingConfig {
    /// Open borrows allowed per account
    pub max_borrow_limit: u32,
    /// Due date offset from the moment of borrowing
    pub loan_period: Duration,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            max_borrow_limit: 3,
            loan_period: Duration::days(14),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LendingConfig::default();
        assert_eq!(config.max_borrow_limit, 3);
        assert_eq!(config.loan_period.num_days(), 14);
    }
}
