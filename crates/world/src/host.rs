//! The narrow surface through which the world engine is consumed.
//!
//! Everything in this crate reads and mutates the host only through these
//! traits, so tests and the headless console can substitute [`crate::MemoryWorld`].

use std::collections::BTreeMap;

use voidworld_core::{ActorId, BlockPos, RegistryKey};

/// Numeric block handle issued by a [`BlockCatalog`].
pub type BlockId = u16;

/// Block handle plus optional state properties (`facing=north`, `type=bottom`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockState {
    /// Block type handle.
    pub id: BlockId,
    /// State properties; empty means the block's default state.
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    /// Default state of `id`.
    pub fn of(id: BlockId) -> Self {
        Self {
            id,
            properties: BTreeMap::new(),
        }
    }

    /// State of `id` with the supplied properties.
    pub fn with_properties(id: BlockId, properties: BTreeMap<String, String>) -> Self {
        Self { id, properties }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Side effects requested from a block write.
    pub struct UpdateFlags: u8 {
        /// Notify neighbouring blocks of the change.
        const NEIGHBORS = 0b0000_0001;
        /// Send the change to connected clients.
        const CLIENTS = 0b0000_0010;
        /// Full update (neighbours and clients).
        const ALL = Self::NEIGHBORS.bits() | Self::CLIENTS.bits();
    }
}

impl Default for UpdateFlags {
    fn default() -> Self {
        UpdateFlags::ALL
    }
}

/// Lookup from block identifier strings to block handles.
pub trait BlockCatalog {
    /// Resolve an identifier such as `minecraft:stone_bricks`.
    fn resolve(&self, identifier: &str) -> Option<BlockId>;

    /// The empty/air sentinel.
    fn air(&self) -> BlockId;

    /// Identifier of a handle, if known.
    fn name_of(&self, id: BlockId) -> Option<&str>;

    /// Whether `id` is the air sentinel.
    fn is_air(&self, id: BlockId) -> bool {
        id == self.air()
    }
}

/// Block-grid read/write access to the host's dimensions.
pub trait WorldAccess {
    /// Whether the host currently has `dimension` loaded.
    fn has_dimension(&self, dimension: &RegistryKey) -> bool;

    /// Current block at `pos`; air for untouched cells.
    fn block_at(&self, dimension: &RegistryKey, pos: BlockPos) -> BlockState;

    /// Write a block. Returns `false` if the host rejected the write.
    fn set_block(
        &mut self,
        dimension: &RegistryKey,
        pos: BlockPos,
        state: BlockState,
        flags: UpdateFlags,
    ) -> bool;

    /// Replace the four text lines of a sign block already placed at `pos`.
    fn set_sign_text(&mut self, dimension: &RegistryKey, pos: BlockPos, lines: [String; 4])
        -> bool;
}

/// Where an actor-facing message is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageChannel {
    /// Persistent chat/console line.
    Chat,
    /// Transient overlay above the hotbar.
    ActionBar,
}

/// Per-actor transient message/display primitive.
pub trait MessageSink {
    /// Deliver `text` to `actor`.
    fn send(&mut self, actor: ActorId, channel: MessageChannel, text: &str);

    /// Shorthand for a chat line.
    fn chat(&mut self, actor: ActorId, text: &str) {
        self.send(actor, MessageChannel::Chat, text);
    }
}

/// Sink that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn send(&mut self, _actor: ActorId, _channel: MessageChannel, _text: &str) {}
}
