//! Refinement loop building blocks
//!
//! Kept free of capability calls so the bounded-retry and degraded
//! acceptance rules can be tested in isolation:
//! - [`RetryBudget`]: strictly decreasing counter
//! - [`RefinementHistory`]: persistent list of attempts
//! - [`RefinementPolicy`]: pure accept / refine / exhausted decision

mod budget;
mod history;
mod policy;

pub use budget::RetryBudget;
pub use history::{Attempt, RefinementHistory};
pub use policy::{Decision, RefinementPolicy};
