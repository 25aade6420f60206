//! Analogy Ontology - the consistency gate between alignment and validation
//!
//! Every node is tagged with exactly one of three categories
//! (STRUCTURE, FUNCTION, ATTRIBUTE). A mapping pair is ontologically
//! compatible only when both endpoints carry the same category; the gate
//! is pure and never fails, so a wrong mapping is rejected rather than
//! crashing the pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use analogy_ontology::check_ontology;
//!
//! let verdict = check_ontology(&mapping, &graph_a, &graph_b);
//! if !verdict.consistent {
//!     println!("{}", verdict.feedback());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod checker;
pub mod rules;

pub use checker::{check_ontology, CategoryMismatch, OntologyChecker, OntologyVerdict};
pub use rules::{
    ontology_full, ALIGNMENT_RULES, ONTOLOGY_TAXONOMY, POLYMORPHISM_RULE,
    SIGNAL_STATE_AND_DECOUPLING,
};
