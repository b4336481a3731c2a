//! # Phases Module
//!
//! Static geometric analysis of a junction: which subsets of traffic lights
//! may be held green simultaneously.
//!
//! ## Overview
//!
//! Two lights are *compatible* when none of their permitted movements can
//! intersect inside the junction. Compatibility is a symmetric, reflexive,
//! non-transitive relation, so the sets of lights that can safely share green
//! are exactly the cliques of the induced compatibility graph, and the
//! *maximal phases* the controller chooses from are its maximal cliques.
//!
//! ## Pairwise non-conflict predicate
//!
//! Lights L1 and L2 are non-conflicting iff all three sub-predicates hold:
//!
//! 1. **No merge conflict** - if their origin roads differ, no destination
//!    road is shared (two inbound flows must not pour into one outbound road).
//! 2. **No straight-cross conflict** - not both straight-through on
//!    perpendicular origin roads.
//! 3. **No protected-left conflict** - if one light permits a left turn, the
//!    other must either share its origin road or permit only right turns.
//!
//! ```text
//!        N
//!        │ ▲
//!        ▼ │              L1: S→N straight    ┐ perpendicular origins,
//!  W ───────────► E       L2: W→E straight    ┘ both straight → conflict
//!        │ ▲
//!        ▼ │              L3: W→N left        conflicts with any light that
//!        S                                    neither shares road 'W' nor
//!                                             turns only right
//! ```
//!
//! ## Components
//!
//! - [`compatibility::CompatibilityMatrix`] - explicit adjacency matrix over lights
//! - [`compatibility::are_compatible`] - the pairwise predicate
//! - [`enumerator::maximal_phases`] - maximal-clique enumeration (Bron-Kerbosch)
//! - [`enumerator::Phase`] - a sorted tuple of lights held green together
//!
//! The enumerator is pure: no I/O, no mutation of its inputs, and its output
//! order is stable across calls on the same topology.
pub mod compatibility;
pub mod enumerator;

pub use self::compatibility::CompatibilityMatrix;
pub use self::enumerator::{maximal_phases, Phase};
