//! The node-pool collaborator interface.
//!
//! Node discovery, validation, and scoring live outside this core. The
//! transport only needs a handful of operations from the pool: hand out a
//! path, accept bad-path and bad-node marks, and expose the flat relay list
//! for the proxy fallback. All operations are atomic from the caller's
//! perspective; the pool serializes its own state.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use sable_types::network::ServiceNode;
use sable_types::Ed25519PublicKeyBytes;
use tracing::debug;

use crate::path::OnionPath;
use crate::{OnionError, Result, DEFAULT_PATH_HOPS};

/// External node-pool collaborator.
#[async_trait]
pub trait NodePool: Send + Sync {
    /// Obtain a fresh path, excluding the given node identity (normally the
    /// request's destination) from every hop.
    async fn onion_path(&self, excluding: Option<&Ed25519PublicKeyBytes>) -> Result<OnionPath>;

    /// Record that a path failed; its hops should not be handed out again
    /// until the pool refreshes.
    async fn mark_path_bad(&self, path: &OnionPath);

    /// The flat list of currently usable relays.
    async fn random_pool(&self) -> Vec<ServiceNode>;

    /// Record that a single relay is unreachable or deregistering.
    async fn mark_node_unreachable(&self, node: &ServiceNode);

    /// Record that a destination itself could not be reached through any
    /// relay; callers stop routing to it until the pool says otherwise.
    async fn mark_destination_unreachable(&self, ed25519_hex: &str);

    /// Re-fetch or re-admit relays after exhaustion.
    async fn refresh_pool(&self) -> Result<()>;
}

#[derive(Default)]
struct PoolState {
    nodes: Vec<ServiceNode>,
    bad_nodes: HashSet<Ed25519PublicKeyBytes>,
    unreachable_destinations: HashSet<String>,
}

/// In-memory node pool.
///
/// Holds a fixed relay list and tracks bad-node marks; a refresh re-admits
/// every marked node. Embedders with real discovery implement [`NodePool`]
/// themselves; this implementation backs tests and static deployments.
pub struct StaticNodePool {
    state: Mutex<PoolState>,
    path_hops: usize,
}

impl StaticNodePool {
    /// Create a pool over a fixed relay list with the default path length.
    pub fn new(nodes: Vec<ServiceNode>) -> Self {
        Self::with_path_hops(nodes, DEFAULT_PATH_HOPS)
    }

    /// Create a pool that hands out paths of the given hop count.
    pub fn with_path_hops(nodes: Vec<ServiceNode>, path_hops: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                nodes,
                ..PoolState::default()
            }),
            path_hops,
        }
    }

    /// Whether a destination has been marked unreachable.
    pub fn is_destination_unreachable(&self, ed25519_hex: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.unreachable_destinations.contains(ed25519_hex)
    }

    fn usable_nodes(
        state: &PoolState,
        excluding: Option<&Ed25519PublicKeyBytes>,
    ) -> Vec<ServiceNode> {
        state
            .nodes
            .iter()
            .filter(|n| !state.bad_nodes.contains(&n.ed25519_pk))
            .filter(|n| excluding != Some(&n.ed25519_pk))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NodePool for StaticNodePool {
    async fn onion_path(&self, excluding: Option<&Ed25519PublicKeyBytes>) -> Result<OnionPath> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut usable = Self::usable_nodes(&state, excluding);

        if usable.len() < self.path_hops {
            return Err(OnionError::InsufficientNodes {
                need: self.path_hops,
                have: usable.len(),
            });
        }

        usable.shuffle(&mut rand::thread_rng());
        usable.truncate(self.path_hops);
        debug!(hops = usable.len(), "assembled onion path");
        OnionPath::new(usable)
    }

    async fn mark_path_bad(&self, path: &OnionPath) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for hop in path.hops() {
            state.bad_nodes.insert(hop.ed25519_pk);
        }
        debug!(hops = path.len(), "marked path bad");
    }

    async fn random_pool(&self) -> Vec<ServiceNode> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Self::usable_nodes(&state, None)
    }

    async fn mark_node_unreachable(&self, node: &ServiceNode) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.bad_nodes.insert(node.ed25519_pk);
        debug!(node = %node.ed25519_hex(), "marked node unreachable");
    }

    async fn mark_destination_unreachable(&self, ed25519_hex: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.unreachable_destinations.insert(ed25519_hex.to_string());
        debug!(destination = ed25519_hex, "marked destination unreachable");
    }

    async fn refresh_pool(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.bad_nodes.clear();
        debug!(nodes = state.nodes.len(), "pool refreshed");
        Ok(())
    }
}
