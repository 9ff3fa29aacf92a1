// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hit proxies: small integer ids, drawn as colors, that map picked pixels back to
//! scene objects.
//!
//! The [`HitProxyRegistry`] is the only structure of the drawing core that is shared
//! across threads: hit-testable objects may be dropped on the game thread while the
//! rendering thread runs a picking pass. Every operation takes the registry mutex
//! for O(1) work and never holds it across a draw.

use crate::renderer::error::HitProxyError;
use glam::Vec4;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A 24-bit hit proxy id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitProxyId(u32);

impl HitProxyId {
    /// Number of representable ids.
    pub const MAX_SLOTS: u32 = 1 << 24;

    /// Reserved id of pixels that hit nothing. Never returned by the registry.
    pub const INVISIBLE: HitProxyId = HitProxyId(Self::MAX_SLOTS - 1);

    /// Wraps a slot index. Returns `None` if it does not fit in 24 bits.
    pub fn new(index: u32) -> Option<Self> {
        (index < Self::MAX_SLOTS).then_some(Self(index))
    }

    /// The slot index.
    pub fn index(self) -> u32 {
        self.0
    }

    /// Packs the id into RGB: R = bits 16..24, G = bits 8..16, B = bits 0..8.
    pub fn to_color(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Exact inverse of [`Self::to_color`].
    pub fn from_color(color: [u8; 3]) -> Self {
        Self((u32::from(color[0]) << 16) | (u32::from(color[1]) << 8) | u32::from(color[2]))
    }

    /// The color as a normalized shader constant. Alpha is zero.
    pub fn to_linear(self) -> Vec4 {
        let [r, g, b] = self.to_color();
        Vec4::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            0.0,
        )
    }
}

/// Cursor shown while hovering a hit proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseCursor {
    /// Arrow.
    #[default]
    Default,
    /// Crosshairs.
    Crosshairs,
    /// Pointing hand.
    Hand,
    /// Four-way move.
    CardinalCross,
}

/// A registered hit-testable object.
#[derive(Clone)]
pub struct HitProxyEntry {
    /// The id the object is drawn with.
    pub id: HitProxyId,
    /// The object. Downcast by the picking UI.
    pub target: Arc<dyn Any + Send + Sync>,
    /// Cursor hint.
    pub cursor: MouseCursor,
    /// Pickable even when drawn translucent and translucent picking is disabled.
    pub always_allow_translucent: bool,
}

impl fmt::Debug for HitProxyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitProxyEntry")
            .field("id", &self.id)
            .field("cursor", &self.cursor)
            .field("always_allow_translucent", &self.always_allow_translucent)
            .finish_non_exhaustive()
    }
}

/// Slot table. `entries.len()` is the high-water mark; ids below it that hold
/// no entry are on `free`.
#[derive(Default)]
struct RegistrySlots {
    entries: Vec<Option<HitProxyEntry>>,
    free: Vec<u32>,
    live: usize,
}

/// The id-to-object table of the picking pass.
pub struct HitProxyRegistry {
    slots: Mutex<RegistrySlots>,
    limit: u32,
}

impl HitProxyRegistry {
    /// A registry spanning the whole 24-bit id space.
    pub fn new() -> Self {
        Self::with_limit(HitProxyId::INVISIBLE.index())
    }

    /// A registry handing out ids below `limit`, clamped to the invisible sentinel.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            slots: Mutex::new(RegistrySlots::default()),
            limit: limit.min(HitProxyId::INVISIBLE.index()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistrySlots> {
        // The slot table stays consistent across any panic inside the O(1) sections.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an object, reusing the most recently freed slot before growing.
    pub fn add(
        &self,
        target: Arc<dyn Any + Send + Sync>,
        cursor: MouseCursor,
        always_allow_translucent: bool,
    ) -> Result<HitProxyId, HitProxyError> {
        let mut slots = self.lock();
        let index = match slots.free.pop() {
            Some(index) => index as usize,
            None if slots.entries.len() < self.limit as usize => {
                slots.entries.push(None);
                slots.entries.len() - 1
            }
            None => {
                log::warn!("Hit proxy id space exhausted ({} ids in use).", self.limit);
                return Err(HitProxyError::Exhausted);
            }
        };
        let id = HitProxyId(index as u32);
        slots.entries[index] = Some(HitProxyEntry {
            id,
            target,
            cursor,
            always_allow_translucent,
        });
        slots.live += 1;
        Ok(id)
    }

    /// Frees a slot. Returns `false` if it was not allocated.
    pub fn remove(&self, id: HitProxyId) -> bool {
        let mut slots = self.lock();
        let index = id.index() as usize;
        if slots.entries.get_mut(index).and_then(Option::take).is_none() {
            log::warn!("Hit proxy {id:?} removed but not registered.");
            return false;
        }
        slots.free.push(id.index());
        slots.live -= 1;
        true
    }

    /// The entry registered under `id`, or `None` for freed, never-allocated or
    /// out-of-range ids.
    pub fn lookup(&self, id: HitProxyId) -> Option<HitProxyEntry> {
        self.lock().entries.get(id.index() as usize)?.clone()
    }

    /// Decodes a read-back pixel and looks it up.
    pub fn lookup_color(&self, color: [u8; 3]) -> Option<HitProxyEntry> {
        let id = HitProxyId::from_color(color);
        if id == HitProxyId::INVISIBLE {
            return None;
        }
        self.lookup(id)
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.lock().live
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut slots = self.lock();
        slots.entries.clear();
        slots.free.clear();
        slots.live = 0;
    }

    /// Registers an object and returns a guard that frees the slot when dropped.
    pub fn register(
        self: &Arc<Self>,
        target: Arc<dyn Any + Send + Sync>,
        cursor: MouseCursor,
        always_allow_translucent: bool,
    ) -> Result<HitProxyHandle, HitProxyError> {
        let id = self.add(target, cursor, always_allow_translucent)?;
        Ok(HitProxyHandle {
            registry: Arc::clone(self),
            id,
        })
    }
}

impl Default for HitProxyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HitProxyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitProxyRegistry")
            .field("len", &self.len())
            .field("limit", &self.limit)
            .finish()
    }
}

/// Owns a registry slot for as long as the hit-testable object lives.
#[derive(Debug)]
pub struct HitProxyHandle {
    registry: Arc<HitProxyRegistry>,
    id: HitProxyId,
}

impl HitProxyHandle {
    /// The id to draw with.
    pub fn id(&self) -> HitProxyId {
        self.id
    }
}

impl Drop for HitProxyHandle {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
