//! Rebuild the call hierarchy from flat trace events.
//!
//! Events reference their enclosing event through `parentId`. Linking is
//! lossy on purpose: events without an `id` are dropped, a repeated `id`
//! keeps only its last event, and an unknown `parentId` turns the event
//! into a root. Those cases are reported as anomalies but never change
//! the resulting forest.

use crate::parser::TraceEvent;
use log::{debug, warn};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A trace event with a known `id` and its linked children
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceNode {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub name: String,
    pub duration: f64,
    pub start_time: f64,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// Wrap an event in a childless node; `None` when the event has no `id`
    pub fn from_event(event: TraceEvent) -> Option<Self> {
        let id = event.id?;
        Some(Self {
            id,
            parent_id: event.parent_id,
            name: event.name,
            duration: event.duration,
            start_time: event.start_time,
            trace_id: event.trace_id,
            timestamp: event.timestamp,
            tags: event.tags,
            children: Vec::new(),
        })
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(TraceNode::subtree_size).sum::<usize>()
    }
}

/// Irregularity in the parent/child links of a trace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralAnomaly {
    /// Several events share an `id`; only the last one was kept
    DuplicateId { id: i64, occurrences: usize },

    /// `parentId` names no known event; the event became a root
    DanglingParent { id: i64, parent_id: i64 },

    /// Elapsed time below zero
    NegativeDuration { id: i64, duration: f64 },

    /// Events whose parent links form a loop; none of them is in the forest
    Cycle { ids: Vec<i64> },

    /// Event hanging below a loop; unreachable from any root
    Detached { id: i64 },
}

impl fmt::Display for StructuralAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id, occurrences } => write!(
                f,
                "Duplicate id {} ({} events), keeping the last one",
                id, occurrences
            ),
            Self::DanglingParent { id, parent_id } => write!(
                f,
                "Event {} references unknown parent {}, treated as root",
                id, parent_id
            ),
            Self::NegativeDuration { id, duration } => {
                write!(f, "Event {} has negative duration {}ms", id, duration)
            }
            Self::Cycle { ids } => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "Parent cycle between events [{}], dropped from the tree", ids.join(", "))
            }
            Self::Detached { id } => {
                write!(f, "Event {} only reachable through a parent cycle, dropped from the tree", id)
            }
        }
    }
}

/// Forest plus the anomalies found while linking it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceForest {
    /// Top-level nodes, in `id` definition order
    pub roots: Vec<TraceNode>,

    /// Irregular links, in detection order
    pub anomalies: Vec<StructuralAnomaly>,

    /// Events dropped because they carry no `id`
    pub skipped_without_id: usize,
}

impl TraceForest {
    /// Anomalies rendered as plain strings
    pub fn warnings(&self) -> Vec<String> {
        self.anomalies.iter().map(ToString::to_string).collect()
    }

    /// Number of nodes reachable from the roots
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(TraceNode::subtree_size).sum()
    }
}

/// Build the forest of trace nodes
///
/// **Public** - main entry point for hierarchy reconstruction
pub fn build_trace_tree(events: &[TraceEvent]) -> Vec<TraceNode> {
    build_trace_forest(events).roots
}

/// Build the forest of trace nodes and report structural anomalies
///
/// **Public** - same forest as `build_trace_tree`
///
/// # Algorithm
/// 1. Drop events without `id`, index the rest by `id` (last write wins,
///    first-seen position kept)
/// 2. Attach each indexed node to its parent if the parent is indexed,
///    otherwise make it a root
/// 3. Assemble owned subtrees from the roots down
/// 4. Whatever was not reached sits on or below a parent cycle
pub fn build_trace_forest(events: &[TraceEvent]) -> TraceForest {
    let mut forest = TraceForest::default();

    // Step 1: index by id
    let mut slots: Vec<Option<TraceNode>> = Vec::new();
    let mut index_of: HashMap<i64, usize> = HashMap::new();
    let mut occurrences: Vec<usize> = Vec::new();

    for event in events {
        let Some(node) = TraceNode::from_event(event.clone()) else {
            forest.skipped_without_id += 1;
            continue;
        };

        match index_of.entry(node.id) {
            Entry::Occupied(entry) => {
                let slot = *entry.get();
                slots[slot] = Some(node);
                occurrences[slot] += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert(slots.len());
                slots.push(Some(node));
                occurrences.push(1);
            }
        }
    }

    debug!(
        "Processing {} valid events out of {} total events",
        events.len() - forest.skipped_without_id,
        events.len()
    );

    // Step 2: link
    let mut parent_of: Vec<Option<usize>> = vec![None; slots.len()];
    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut root_slots: Vec<usize> = Vec::new();

    for (slot, node) in slots.iter().enumerate() {
        let Some(node) = node else { continue };

        if occurrences[slot] > 1 {
            forest.anomalies.push(StructuralAnomaly::DuplicateId {
                id: node.id,
                occurrences: occurrences[slot],
            });
        }
        if node.duration < 0.0 {
            forest.anomalies.push(StructuralAnomaly::NegativeDuration {
                id: node.id,
                duration: node.duration,
            });
        }

        match node.parent_id.map(|pid| (pid, index_of.get(&pid).copied())) {
            Some((_, Some(parent))) => {
                parent_of[slot] = Some(parent);
                children_of[parent].push(slot);
            }
            Some((parent_id, None)) => {
                forest.anomalies.push(StructuralAnomaly::DanglingParent {
                    id: node.id,
                    parent_id,
                });
                root_slots.push(slot);
            }
            None => root_slots.push(slot),
        }
    }

    // Step 3: assemble owned subtrees
    let mut reached = vec![false; slots.len()];
    for &slot in &root_slots {
        if let Some(root) = assemble(slot, &mut slots, &children_of, &mut reached) {
            forest.roots.push(root);
        }
    }

    // Step 4: account for the unreachable remainder
    let lost = detect_cycles(&parent_of, &reached, &index_of_ids(&index_of, slots.len()));
    forest.anomalies.extend(lost);

    for anomaly in &forest.anomalies {
        warn!("{}", anomaly);
    }

    debug!(
        "Built forest with {} roots ({} nodes)",
        forest.roots.len(),
        forest.node_count()
    );

    forest
}

/// Move a node and its descendants out of the slot table
///
/// **Private** - recursion depth equals the subtree depth; parent links
/// below a root never loop back, so each slot is taken at most once
fn assemble(
    slot: usize,
    slots: &mut [Option<TraceNode>],
    children_of: &[Vec<usize>],
    reached: &mut [bool],
) -> Option<TraceNode> {
    let mut node = slots[slot].take()?;
    reached[slot] = true;

    for &child in &children_of[slot] {
        if let Some(child_node) = assemble(child, slots, children_of, reached) {
            node.children.push(child_node);
        }
    }

    Some(node)
}

/// Slot to `id` table
///
/// **Private** - internal helper for build_trace_forest
fn index_of_ids(index_of: &HashMap<i64, usize>, len: usize) -> Vec<i64> {
    let mut ids = vec![0; len];
    for (&id, &slot) in index_of {
        ids[slot] = id;
    }
    ids
}

/// Classify unreached slots as cycle members or detached descendants
///
/// **Private** - walks parent links from each unreached slot; every
/// unreached slot has a parent, so each walk ends on a loop or on a
/// slot already classified
fn detect_cycles(
    parent_of: &[Option<usize>],
    reached: &[bool],
    ids: &[i64],
) -> Vec<StructuralAnomaly> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks: Vec<Mark> = reached
        .iter()
        .map(|&r| if r { Mark::Done } else { Mark::Unvisited })
        .collect();
    let mut in_cycle = vec![false; parent_of.len()];
    let mut cycles = Vec::new();

    for start in 0..parent_of.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(slot) = current {
            match marks[slot] {
                Mark::Done => break,
                Mark::OnPath => {
                    let pos = path.iter().position(|&s| s == slot).unwrap_or(0);
                    let members: Vec<usize> = path[pos..].to_vec();
                    for &member in &members {
                        in_cycle[member] = true;
                    }
                    cycles.push(StructuralAnomaly::Cycle {
                        ids: members.iter().map(|&s| ids[s]).collect(),
                    });
                    break;
                }
                Mark::Unvisited => {
                    marks[slot] = Mark::OnPath;
                    path.push(slot);
                    current = parent_of[slot];
                }
            }
        }

        for slot in path {
            marks[slot] = Mark::Done;
        }
    }

    let detached = (0..parent_of.len())
        .filter(|&slot| !reached[slot] && !in_cycle[slot])
        .map(|slot| StructuralAnomaly::Detached { id: ids[slot] });

    cycles.into_iter().chain(detached).collect()
}
