//! Quorum entity models.
//!
//! The rows the dashboard manages: fund requests, expense transactions,
//! income-generating projects (IGPs), locker rentals, water funds, and
//! violation fines. Each module defines the row struct, its status enum,
//! the create payload, and an all-`Option` shallow-merge patch type.
//!
//! Every row implements [`quorum_core::Record`] so the optimistic
//! mutation engine can match placeholders and refresh timestamps
//! without knowing the concrete entity.

pub mod expense;
pub mod fund_request;
pub mod igp;
pub mod locker;
pub mod violation;
pub mod water_fund;

pub use expense::{ExpenseTransaction, ExpenseTransactionPatch, NewExpenseTransaction};
pub use fund_request::{
    FundRequest, FundRequestPatch, FundRequestStatus, FundRequestWithExpenses, NewFundRequest,
};
pub use igp::{Igp, IgpPatch, IgpStatus, NewIgp};
pub use locker::{LockerRental, LockerRentalPatch, LockerStatus, NewLockerRental};
pub use violation::{NewViolation, Violation, ViolationPatch, ViolationStatus};
pub use water_fund::{NewWaterFund, WaterFund, WaterFundPatch};
