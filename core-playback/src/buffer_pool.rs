//! # Buffer Pool
//!
//! The backend buffers owned by one binding of a [`PlaybackSource`](crate::PlaybackSource).
//! A static binding owns one buffer, a streaming binding owns two that take
//! turns being played and refilled.

use bridge_traits::audio::{AudioBackend, BufferId};
use bridge_traits::error::BridgeError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Lifecycle of one pooled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotState {
    /// Allocated, never filled.
    Free,
    /// Filled and attached to the source.
    Queued,
    /// Detached after playback; its contents are stale.
    Processed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSlot {
    pub id: BufferId,
    pub state: SlotState,
}

/// Fixed set of backend buffers for one binding.
#[derive(Debug)]
pub struct BufferPool {
    slots: Vec<BufferSlot>,
}

impl BufferPool {
    pub const STATIC_SLOTS: usize = 1;
    pub const STREAMING_SLOTS: usize = 2;

    /// Number of buffers a binding needs.
    pub fn slot_count(streaming: bool) -> usize {
        if streaming {
            Self::STREAMING_SLOTS
        } else {
            Self::STATIC_SLOTS
        }
    }

    /// Allocate the buffers for a static or streaming binding.
    pub fn allocate(backend: &dyn AudioBackend, streaming: bool) -> Result<Self> {
        let count = Self::slot_count(streaming);
        let ids = backend.create_buffers(count)?;
        if ids.len() != count {
            let _ = backend.delete_buffers(&ids);
            return Err(BridgeError::OperationFailed(format!(
                "backend returned {} buffers, expected {}",
                ids.len(),
                count
            ))
            .into());
        }
        debug!(count, streaming, "Allocated buffer pool");
        Ok(Self {
            slots: ids
                .into_iter()
                .map(|id| BufferSlot {
                    id,
                    state: SlotState::Free,
                })
                .collect(),
        })
    }

    /// Buffer handles in slot order.
    pub fn ids(&self) -> Vec<BufferId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    pub fn slots(&self) -> &[BufferSlot] {
        &self.slots
    }

    pub fn slot(&self, id: BufferId) -> Option<&BufferSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    /// Record a state transition. Returns `false` if `id` is not pooled.
    pub fn mark(&mut self, id: BufferId, state: SlotState) -> bool {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => {
                slot.state = state;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently attached to the source.
    pub fn queued_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Queued)
            .count()
    }

    /// Delete every buffer. The source must have detached them first.
    pub fn release(self, backend: &dyn AudioBackend) -> Result<()> {
        let ids = self.ids();
        backend.delete_buffers(&ids)?;
        debug!(count = ids.len(), "Released buffer pool");
        Ok(())
    }
}
