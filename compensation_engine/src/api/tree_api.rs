use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use log::{debug, trace};

use crate::{
    api::tree_objects::{assemble_tree, TreeNode},
    db_types::{Leg, Member},
    traits::{CompensationDatabase, MemberApiError, PlacementError},
};

/// Depth of the tree window rendered when the caller does not ask for one.
pub const DEFAULT_TREE_DEPTH: u32 = 3;

/// How long an assembled subtree stays valid. Placements clear the cache outright, so the TTL
/// only bounds staleness against writes made outside this process.
pub const SUBTREE_CACHE_TTL: Duration = Duration::from_secs(300);

struct CachedTree {
    built_at: Instant,
    tree: TreeNode,
}

/// Tree rendering and placement.
///
/// Reads are served from an in-memory cache keyed on `(root, depth)`; any placement clears the
/// whole cache, since a new node changes every window that contains an ancestor of its parent
/// and working that set out precisely is not worth it.
pub struct TreeApi<B> {
    db: B,
    cache: Arc<DashMap<(i64, u32), CachedTree>>,
}

impl<B: Clone> Clone for TreeApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), cache: Arc::clone(&self.cache) }
    }
}

impl<B> TreeApi<B>
where B: CompensationDatabase
{
    pub fn new(db: B) -> Self {
        Self { db, cache: Arc::new(DashMap::new()) }
    }

    /// Renders the subtree rooted at `root_id`, `max_depth` levels deep. `None` if the member
    /// does not exist.
    pub async fn subtree(&self, root_id: i64, max_depth: u32) -> Result<Option<TreeNode>, MemberApiError> {
        let key = (root_id, max_depth);
        if let Some(cached) = self.cache.get(&key) {
            if cached.built_at.elapsed() < SUBTREE_CACHE_TTL {
                trace!("🌳️ Subtree ({root_id}, {max_depth}) served from cache");
                return Ok(Some(cached.tree.clone()));
            }
        }
        let rows = self.db.fetch_subtree(root_id, max_depth).await?;
        let Some(tree) = assemble_tree(&rows, root_id, max_depth) else {
            return Ok(None);
        };
        self.cache.insert(key, CachedTree { built_at: Instant::now(), tree: tree.clone() });
        Ok(Some(tree))
    }

    /// Renders the subtree rooted at `root_id` at the standard window depth.
    pub async fn default_subtree(&self, root_id: i64) -> Result<Option<TreeNode>, MemberApiError> {
        self.subtree(root_id, DEFAULT_TREE_DEPTH).await
    }

    /// Places an unplaced member on a specific leg of a specific parent.
    pub async fn place(&self, member_id: i64, parent_id: i64, leg: Leg) -> Result<Member, PlacementError> {
        let member = self.db.place_member(member_id, parent_id, leg).await?;
        self.clear_cache();
        Ok(member)
    }

    /// Auto-placement: descends from `parent_id` along `preferred_leg` to the first empty slot
    /// and places the member there.
    pub async fn place_at_first_empty_leg(
        &self,
        member_id: i64,
        parent_id: i64,
        preferred_leg: Leg,
    ) -> Result<Member, PlacementError> {
        let target = self.db.find_first_empty_leg(parent_id, preferred_leg).await?;
        self.place(member_id, target, preferred_leg).await
    }

    pub async fn team_count(&self, member_id: i64, leg: Option<Leg>) -> Result<u64, MemberApiError> {
        self.db.count_team(member_id, leg).await
    }

    /// Members referred by the sponsor and still waiting to be placed.
    pub async fn pending_placements(&self, sponsor_id: i64) -> Result<Vec<Member>, MemberApiError> {
        self.db.pending_placements(sponsor_id).await
    }

    fn clear_cache(&self) {
        if !self.cache.is_empty() {
            debug!("🌳️ Tree changed. Dropping {} cached subtree(s)", self.cache.len());
            self.cache.clear();
        }
    }
}
