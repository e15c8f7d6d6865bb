use bitcoin::consensus::encode::{serialize as consensus_serialize, VarInt};

/// Serializes a witness stack: the number of items followed by each item with
/// its length prefix, both as compact-size integers.
///
/// This is the encoding a witness takes inside a transaction, for contexts
/// that only carry a flat script buffer.
pub fn serialize<I, T>(stack: I) -> Vec<u8>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
    T: AsRef<[u8]>,
{
    let stack = stack.into_iter();
    let mut buffer = consensus_serialize(&VarInt(stack.len() as u64));

    for item in stack {
        let item = item.as_ref();
        buffer.extend(consensus_serialize(&VarInt(item.len() as u64)));
        buffer.extend_from_slice(item);
    }

    buffer
}
