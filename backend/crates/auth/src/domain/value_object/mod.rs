//! Value Object Module

pub mod account_name;
pub mod lockout;

pub use account_name::{AccountName, AccountNameError, PROTECTED_ACCOUNT};
pub use kernel::identity::Role;
pub use lockout::{AccountState, Lockout};
