//! Overflow path for diffs too large for the primary transport.

mod temp_store;

pub use temp_store::TempChangeOpStore;
