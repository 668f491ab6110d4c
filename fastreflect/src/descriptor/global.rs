use log::debug;
use once_cell::sync::Lazy;

use crate::{
    descriptor::{DescriptorError, DescriptorPool, MessageDescriptor},
    genutil,
};

/// Serialized `FileDescriptorProto`s for every message type defined in this crate.
const EMBEDDED_FILES: &[(&str, &[u8])] = &[(genutil::FILE_NAME, genutil::FILE_DESCRIPTOR)];

static GLOBAL_POOL: Lazy<DescriptorPool> = Lazy::new(|| build_pool(EMBEDDED_FILES));

pub(super) fn pool() -> &'static DescriptorPool {
    &GLOBAL_POOL
}

/// Looks up a message type in the process-wide registry.
///
/// Fails with [`NotFound`](crate::DescriptorErrorKind::NotFound) if no message with the given
/// fully-qualified name was ever registered.
///
/// # Examples
///
/// ```
/// let desc = fastreflect::describe("cosmos.genutil.v1beta1.GenesisState").unwrap();
/// assert_eq!(desc.get_field(1).unwrap().name(), "gen_txs");
/// assert!(fastreflect::describe("cosmos.genutil.v1beta1.Missing").is_err());
/// ```
pub fn describe(name: &str) -> Result<MessageDescriptor, DescriptorError> {
    pool().describe(name)
}

pub(super) fn build_pool(files: &[(&str, &[u8])]) -> DescriptorPool {
    let mut pool = DescriptorPool::new();
    for &(name, bytes) in files {
        if let Err(err) = pool.decode_file_descriptor_proto(bytes) {
            panic!("failed to register embedded descriptor '{}': {}", name, err);
        }
        debug!("registered embedded descriptor '{}'", name);
    }
    debug!(
        "built global descriptor pool with {} files and {} messages",
        pool.files().len(),
        pool.messages().len()
    );
    pool
}
