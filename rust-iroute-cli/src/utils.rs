//! Topology input handling for the CLI.

use anyhow::{bail, Context, Result};
use rust_iroute_common::types::{NodeId, Weight};
use rust_iroute_control::Topology;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::TopologyArgs;

/// On-disk topology description.
#[derive(Debug, Deserialize)]
struct TopologyFile {
    /// `[i, j, w]` triples; `[i, j]` pairs default to weight 1.
    edges: Vec<Vec<i64>>,
}

/// Load a topology from a JSON edge list. The node count is one past the
/// highest endpoint mentioned.
pub fn load_topology(path: &Path) -> Result<Topology> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read topology file {}", path.display()))?;
    let file: TopologyFile = serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse topology file {}", path.display()))?;

    let mut edges: Vec<(NodeId, NodeId, Weight)> = Vec::with_capacity(file.edges.len());
    for (index, edge) in file.edges.iter().enumerate() {
        let (i, j, w) = match edge.as_slice() {
            [i, j] => (*i, *j, 1),
            [i, j, w] => (*i, *j, *w),
            _ => bail!("edge #{index} must have 2 or 3 elements, got {}", edge.len()),
        };
        if i < 0 || j < 0 || w < 0 {
            bail!("edge #{index} has a negative field");
        }
        edges.push((i as NodeId, j as NodeId, w as Weight));
    }
    if edges.is_empty() {
        bail!("topology file {} lists no edges", path.display());
    }

    Ok(Topology::from_edges(&edges))
}

/// Resolve the topology the user asked for.
pub fn build_topology(args: &TopologyArgs) -> Result<Topology> {
    if let Some(path) = &args.topology {
        return load_topology(path);
    }
    if let Some(width) = args.grid {
        if width == 0 || args.nodes == 0 {
            bail!("--grid needs a non-zero width and node count");
        }
        return Ok(Topology::grid(args.nodes, width));
    }
    Ok(Topology::geant2())
}
