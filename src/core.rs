pub mod aggregate;
pub mod bill;
pub mod billing;
pub mod demand;
pub mod interval;
pub mod period;
pub mod pricing;
pub mod reading;
pub mod schedule;
