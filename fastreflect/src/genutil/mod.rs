//! Types from the `cosmos.genutil.v1beta1` protobuf package.

mod codec;
#[cfg(feature = "serde")]
mod json;
mod reflect;
#[cfg(test)]
mod tests;

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use once_cell::sync::Lazy;

use crate::{DescriptorPool, FieldDescriptor, MessageDescriptor, ReflectError};

/// The name of the file that declares this package's messages.
pub(crate) const FILE_NAME: &str = "cosmos/genutil/v1beta1/genesis.proto";

/// The serialized `FileDescriptorProto` for [`FILE_NAME`].
pub(crate) const FILE_DESCRIPTOR: &[u8] = include_bytes!("genesis.proto.bin");

static GENESIS_STATE: Lazy<MessageDescriptor> = Lazy::new(|| {
    DescriptorPool::global()
        .get_message_by_name(GenesisState::FULL_NAME)
        .expect("message not found")
});

static GEN_TXS: Lazy<FieldDescriptor> = Lazy::new(|| {
    GENESIS_STATE
        .get_field(GenesisState::GEN_TXS_NUMBER)
        .expect("field not found")
});

/// The genesis state of the `genutil` module.
///
/// Fields the message type does not declare are kept as raw bytes, and written back out unchanged
/// when the message is encoded.
#[derive(Default)]
pub struct GenesisState {
    /// The signed genesis transactions, each encoded as raw bytes.
    pub gen_txs: Vec<Vec<u8>>,
    unknown_fields: Vec<u8>,
    size_cache: AtomicUsize,
}

/// The fields declared by [`GenesisState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenesisStateField {
    GenTxs,
}

impl GenesisState {
    /// The fully-qualified name of this message type.
    pub const FULL_NAME: &'static str = "cosmos.genutil.v1beta1.GenesisState";

    /// The field number of [`gen_txs`](GenesisState::gen_txs).
    pub const GEN_TXS_NUMBER: u32 = 1;

    /// Creates a message with the given transactions and no unknown fields.
    pub fn new(gen_txs: Vec<Vec<u8>>) -> Self {
        GenesisState {
            gen_txs,
            ..Default::default()
        }
    }

    /// Gets the descriptor for this message type from the global pool.
    pub fn message_descriptor() -> MessageDescriptor {
        GENESIS_STATE.clone()
    }

    /// Gets the descriptor of the `gen_txs` field.
    pub fn gen_txs_descriptor() -> FieldDescriptor {
        GEN_TXS.clone()
    }

    fn load_cached_size(&self) -> usize {
        self.size_cache.load(Ordering::Relaxed)
    }

    fn store_cached_size(&self, size: usize) {
        self.size_cache.store(size, Ordering::Relaxed)
    }
}

impl GenesisStateField {
    const ALL: [GenesisStateField; 1] = [GenesisStateField::GenTxs];

    /// Resolves a descriptor to one of this message's fields by name.
    fn from_descriptor(field: &FieldDescriptor) -> Result<Self, ReflectError> {
        match field.full_name() {
            "cosmos.genutil.v1beta1.GenesisState.gen_txs" if !field.is_extension() => {
                Ok(GenesisStateField::GenTxs)
            }
            _ => Err(ReflectError::unknown_field(&GENESIS_STATE, field)),
        }
    }

    fn descriptor(self) -> &'static FieldDescriptor {
        match self {
            GenesisStateField::GenTxs => &*GEN_TXS,
        }
    }
}

impl Clone for GenesisState {
    fn clone(&self) -> Self {
        GenesisState {
            gen_txs: self.gen_txs.clone(),
            unknown_fields: self.unknown_fields.clone(),
            size_cache: AtomicUsize::new(self.load_cached_size()),
        }
    }
}

impl PartialEq for GenesisState {
    fn eq(&self, other: &Self) -> bool {
        self.gen_txs == other.gen_txs && self.unknown_fields == other.unknown_fields
    }
}

impl Eq for GenesisState {}

impl fmt::Debug for GenesisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenesisState")
            .field("gen_txs", &self.gen_txs)
            .field("unknown_fields", &self.unknown_fields)
            .finish()
    }
}
