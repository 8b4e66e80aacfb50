pub mod balance;
pub mod market;
pub mod session;
pub mod system;
pub mod wallet;
