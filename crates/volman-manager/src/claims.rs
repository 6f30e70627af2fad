// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live caller claims on mounted volumes.
//!
//! A claim is held while a mount is in flight and kept once it succeeds; it
//! is released by a successful unmount. The purger treats any volume a plugin
//! reports without a claim as orphaned, and reserves it for the length of the
//! unmount so no mount can claim it in between. The tracker is in memory
//! only, so after a restart every reported mount is orphaned.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Notify;
use tracing::debug;

type ClaimKey = (String, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Claimed(usize),
    Purging,
}

/// Claim counts per (plugin id, volume id).
#[derive(Debug, Default)]
pub struct ClaimTracker {
    slots: DashMap<ClaimKey, Slot>,
    purge_done: Notify,
}

impl ClaimTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one claim and returns the new count.
    ///
    /// Returns `None` without claiming while the volume is being purged.
    pub fn claim(&self, plugin_id: &str, volume_id: &str) -> Option<usize> {
        let mut slot = self
            .slots
            .entry(key(plugin_id, volume_id))
            .or_insert(Slot::Claimed(0));
        let current = *slot;
        match current {
            Slot::Claimed(count) => {
                *slot = Slot::Claimed(count + 1);
                Some(count + 1)
            }
            Slot::Purging => None,
        }
    }

    /// Claims the volume, waiting out any purge of it first.
    ///
    /// The claim is released when the guard drops unless [`ClaimGuard::keep`]
    /// is called.
    pub async fn acquire(&self, plugin_id: &str, volume_id: &str) -> ClaimGuard<'_> {
        loop {
            // Registered before the check so a purge finishing in between still wakes us.
            let purged = self.purge_done.notified();
            if self.claim(plugin_id, volume_id).is_some() {
                return ClaimGuard {
                    tracker: self,
                    key: key(plugin_id, volume_id),
                    armed: true,
                };
            }
            debug!(plugin_id, volume_id, "volume is being purged, waiting");
            purged.await;
        }
    }

    /// Drops one claim and returns the remaining count.
    ///
    /// Releasing an unclaimed volume is a no-op.
    pub fn release(&self, plugin_id: &str, volume_id: &str) -> usize {
        self.release_key(&key(plugin_id, volume_id))
    }

    fn release_key(&self, key: &ClaimKey) -> usize {
        let remaining = match self.slots.get_mut(key) {
            Some(mut slot) => {
                let current = *slot.value();
                match current {
                    Slot::Claimed(count) => {
                        let remaining = count.saturating_sub(1);
                        *slot = Slot::Claimed(remaining);
                        remaining
                    }
                    Slot::Purging => return 0,
                }
            }
            None => return 0,
        };
        if remaining == 0 {
            self.slots
                .remove_if(key, |_, slot| *slot == Slot::Claimed(0));
        }
        remaining
    }

    /// Reserves an unclaimed volume for purging.
    ///
    /// Returns `None` if the volume is claimed or already being purged. While
    /// the guard lives, [`claim`](Self::claim) refuses the volume and
    /// [`acquire`](Self::acquire) waits.
    pub fn begin_purge(&self, plugin_id: &str, volume_id: &str) -> Option<PurgeGuard<'_>> {
        let key = key(plugin_id, volume_id);
        match self.slots.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Purging);
                Some(PurgeGuard { tracker: self, key })
            }
        }
    }

    pub fn count(&self, plugin_id: &str, volume_id: &str) -> usize {
        match self.slots.get(&key(plugin_id, volume_id)).map(|slot| *slot) {
            Some(Slot::Claimed(count)) => count,
            _ => 0,
        }
    }

    pub fn is_claimed(&self, plugin_id: &str, volume_id: &str) -> bool {
        self.count(plugin_id, volume_id) > 0
    }

    pub fn is_purging(&self, plugin_id: &str, volume_id: &str) -> bool {
        matches!(
            self.slots.get(&key(plugin_id, volume_id)).map(|slot| *slot),
            Some(Slot::Purging)
        )
    }

    /// Number of (plugin, volume) pairs with at least one claim.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(*slot.value(), Slot::Claimed(n) if n > 0))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key(plugin_id: &str, volume_id: &str) -> ClaimKey {
    (plugin_id.to_string(), volume_id.to_string())
}

/// A claim taken by [`ClaimTracker::acquire`].
#[must_use = "dropping the guard releases the claim"]
pub struct ClaimGuard<'a> {
    tracker: &'a ClaimTracker,
    key: ClaimKey,
    armed: bool,
}

impl ClaimGuard<'_> {
    /// Keeps the claim past the guard's lifetime.
    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.tracker.release_key(&self.key);
        }
    }
}

/// A purge reservation taken by [`ClaimTracker::begin_purge`].
#[must_use = "dropping the guard ends the purge reservation"]
pub struct PurgeGuard<'a> {
    tracker: &'a ClaimTracker,
    key: ClaimKey,
}

impl Drop for PurgeGuard<'_> {
    fn drop(&mut self) {
        self.tracker
            .slots
            .remove_if(&self.key, |_, slot| *slot == Slot::Purging);
        self.tracker.purge_done.notify_waiters();
    }
}
