use crate::backends::BackendRawBuffer;

/// A bounded view of a GPU buffer, ready to be written into a buffer-class
/// descriptor slot. The buffer itself is created and owned by the memory
/// collaborator; this is a borrowed reference, not an owner.
#[derive(Clone, Copy, Debug)]
pub struct BufferView {
    pub(crate) raw_buffer: BackendRawBuffer,
    offset: u64,
    size: u64,
}

impl BufferView {
    pub fn from_raw(raw_buffer: BackendRawBuffer, offset: u64, size: u64) -> Self {
        Self {
            raw_buffer,
            offset,
            size,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
