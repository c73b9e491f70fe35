//! Explicit ownership for a set of cached rings
//!
//! Code that wants one ring per worker keeps a `RingRegistry` in its own
//! state instead of reaching for a global. Rings are created on first use,
//! dropped on [`remove`](RingRegistry::remove) and all torn down together by
//! [`teardown`](RingRegistry::teardown) or when the registry is dropped.
//!
//! # Example
//!
//! ```no_run
//! use uring_core::{ops::Nop, RingConfig, RingRegistry};
//!
//! let mut registry = RingRegistry::new(RingConfig::new(16));
//! let ring = registry.get_or_init(0usize)?;
//! ring.push(&Nop, 1)?;
//! ring.submit()?;
//! # Ok::<(), uring_core::Error>(())
//! ```

use crate::config::RingConfig;
use crate::error::Result;
use crate::uring::Ring;
use std::collections::hash_map::{Entry, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

/// Rings keyed by worker (or any other owner id), all built from one config
pub struct RingRegistry<K> {
    config: RingConfig,
    rings: HashMap<K, Ring>,
}

impl<K: Eq + Hash + Debug> RingRegistry<K> {
    /// Empty registry; no ring exists until first requested
    pub fn new(config: RingConfig) -> Self {
        Self {
            config,
            rings: HashMap::new(),
        }
    }

    /// The ring for `key`, created if this is the first request
    pub fn get_or_init(&mut self, key: K) -> Result<&mut Ring> {
        match self.rings.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let ring = Ring::with_config(self.config.clone())?;
                log::debug!("registry: created ring for {:?}", entry.key());
                Ok(entry.insert(ring))
            }
        }
    }

    /// The ring for `key`, if one has been created
    pub fn get_mut(&mut self, key: &K) -> Option<&mut Ring> {
        self.rings.get_mut(key)
    }

    /// Take the ring for `key` out of the registry
    pub fn remove(&mut self, key: &K) -> Option<Ring> {
        let ring = self.rings.remove(key);
        if ring.is_some() {
            log::debug!("registry: removed ring for {:?}", key);
        }
        ring
    }

    /// Number of live rings
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// Whether no ring has been created yet
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Configuration new rings are built from
    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Destroy every ring, returning how many were torn down
    pub fn teardown(&mut self) -> usize {
        let count = self.rings.len();
        self.rings.clear();
        if count > 0 {
            log::debug!("registry: tore down {} rings", count);
        }
        count
    }
}
