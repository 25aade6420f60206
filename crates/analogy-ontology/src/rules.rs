//! Ontology rule texts embedded in reasoning prompts

/// The three categories every extracted node must carry
pub const ONTOLOGY_TAXONOMY: &str = "\
Every node extracted from any domain MUST be tagged with exactly one of these three labels:

- [STRUCTURE]: Physical components or entities (the \"What\"). Examples: hardware, cells, servers, neurons, cables, sensors, databases.
- [FUNCTION]: Actions, processes or logic (the \"How\"). Examples: signal transmission, learning, data routing, encoding, decoding, consensus, replication.
- [ATTRIBUTE]: Performance metrics or abstract qualities (the \"Cost/Value\"). Examples: latency, energy, scalability, throughput, reliability, accuracy.";

/// Which cross-domain alignments are allowed
pub const ALIGNMENT_RULES: &str = "\
Alignments are ONLY valid between identical labels:

- ALLOWED: [STRUCTURE] <-> [STRUCTURE]
- ALLOWED: [FUNCTION] <-> [FUNCTION]
- ALLOWED: [ATTRIBUTE] <-> [ATTRIBUTE]
- FORBIDDEN: [STRUCTURE] <-> [FUNCTION] (do not map an axon to a multiplication)
- FORBIDDEN: [STRUCTURE] <-> [ATTRIBUTE] (do not map a component to energy consumption)
- FORBIDDEN: [FUNCTION] <-> [ATTRIBUTE] (do not map a process to a metric)

Any mapping that violates these rules is a categorical mismatch and must be rejected.";

/// Align by ontological role, not by name
pub const POLYMORPHISM_RULE: &str = "\
Mappings are defined by ontological ROLE, not by name or domain. The same interface \
(e.g. STRUCTURE) has many implementations across domains (neuron, cable, server). \
When matching nodes, align by type, not by lexical similarity: a STRUCTURE in domain A \
maps to the STRUCTURE in domain B that plays the same structural role, even if the \
concrete entities have different names.";

/// Guidance for synthesis: signal/state adapters and decoupling
pub const SIGNAL_STATE_AND_DECOUPLING: &str = "\
Signal and state integrity: when the analogy maps discrete events (spikes, packets, tokens) \
to continuous states (conductance, voltage, rate), identify or propose an interface adapter \
(encoding/decoding logic) and mention it in the action plan.

Decoupling: the core analogy (transferable mechanisms) must stay independent of \
implementation details such as specific hardware, I/O or platform.";

/// Taxonomy, alignment rules and polymorphism rule as one prompt block
#[must_use]
pub fn ontology_full() -> String {
    format!("{ONTOLOGY_TAXONOMY}\n\n{ALIGNMENT_RULES}\n\n{POLYMORPHISM_RULE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use analogy_graph::OntologyCategory;

    #[test]
    fn taxonomy_names_every_category() {
        for cat in OntologyCategory::ALL {
            assert!(ONTOLOGY_TAXONOMY.contains(&format!("[{cat}]")));
        }
    }

    #[test]
    fn full_block_contains_all_parts() {
        let full = ontology_full();
        assert!(full.contains("FORBIDDEN"));
        assert!(full.contains("ontological ROLE"));
    }
}
