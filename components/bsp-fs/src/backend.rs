use crate::{flags::OpenFlags, state::VendorError};

type VendorResult<T> = core::result::Result<T, VendorError>;

/// Handle returned by the flash filesystem for an open file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileHandle(pub i32);

/// The device flash filesystem service.
///
/// Implementations report vendor failures as [`VendorError`]; the adapter
/// decides which status they become.
pub trait FlashFs {
    fn open(&mut self, name: &str, flags: OpenFlags) -> VendorResult<FileHandle>;

    /// Reads up to `buf.len()` bytes at `offset`, returning the count read.
    fn read(&mut self, handle: FileHandle, offset: u32, buf: &mut [u8]) -> VendorResult<usize>;

    /// Writes `data` at `offset`, returning the count written.
    fn write(&mut self, handle: FileHandle, offset: u32, data: &[u8]) -> VendorResult<usize>;

    fn close(&mut self, handle: FileHandle) -> VendorResult<()>;

    fn delete(&mut self, name: &str) -> VendorResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// More input is needed.
    Continue,
    /// The archive has been fully consumed.
    Done,
}

/// Result of one decoder step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Processed {
    pub consumed: usize,
    pub progress: Progress,
}

/// Streaming decoder for OTA update archives.
///
/// The decoder owns everything it extracts from the archive; the adapter only
/// feeds it bytes.
pub trait ArchiveDecoder {
    /// Resets the decoder for a new archive.
    fn init(&mut self) -> VendorResult<()>;

    /// Consumes a prefix of `chunk`. Chunks are never longer than
    /// [`ARCHIVE_CHUNK_SIZE`](crate::ARCHIVE_CHUNK_SIZE).
    fn process(&mut self, chunk: &[u8]) -> VendorResult<Processed>;
}
