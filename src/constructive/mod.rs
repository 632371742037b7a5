//! Constructive heuristics for building feasible networks.
//!
//! - [`EdgeList`] — priority-ordered facility pairs and greedy completion, O(f² log f)
//! - [`junction_candidates`] — geometric junction points ranked by multiplicity, O(f² log f)

mod edge_list;
mod junctions;

pub use edge_list::{Edge, EdgeList};
pub use junctions::junction_candidates;
