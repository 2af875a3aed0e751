//! Terminal front-end over the aggregator

pub mod rate;
pub mod setup;
pub mod ui;
