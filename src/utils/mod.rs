// Shared helpers

pub mod units;
