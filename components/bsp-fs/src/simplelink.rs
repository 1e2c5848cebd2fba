//! Bindings to the SimpleLink filesystem and the OTA archive library of the
//! CC32xx SDK.

use core::ffi::c_void;
use core::ptr;

use crate::{
    backend::{ArchiveDecoder, FileHandle, FlashFs, Processed},
    flags::OpenFlags,
    state::VendorError,
    vendor::{archive_init, archive_step, c_len, c_name, count, handle, status},
};

#[allow(non_snake_case)]
mod ffi {
    use core::ffi::c_void;

    extern "C" {
        pub fn sl_FsOpen(file_name: *const u8, access_mode_and_max_size: u32, token: *mut u32)
            -> i32;
        pub fn sl_FsRead(file_hdl: i32, offset: u32, data: *mut u8, len: u32) -> i32;
        pub fn sl_FsWrite(file_hdl: i32, offset: u32, data: *mut u8, len: u32) -> i32;
        pub fn sl_FsClose(
            file_hdl: i32,
            certificate_file_name: *const u8,
            signature: *const u8,
            signature_len: u32,
        ) -> i16;
        pub fn sl_FsDel(file_name: *const u8, token: u32) -> i16;

        pub fn OtaArchive_init(archive: *mut c_void) -> i16;
        pub fn OtaArchive_process(
            archive: *mut c_void,
            buf: *mut u8,
            buf_len: i16,
            processed_size: *mut i16,
        ) -> i16;
    }
}

/// The on-chip SimpleLink flash filesystem.
#[derive(Debug, Default)]
pub struct SimpleLinkFs;

impl FlashFs for SimpleLinkFs {
    fn open(&mut self, name: &str, flags: OpenFlags) -> Result<FileHandle, VendorError> {
        let name = c_name(name)?;
        let mut token = 0u32;
        let token_ptr = if flags.contains(OpenFlags::CREATE_SECURE) {
            ptr::addr_of_mut!(token)
        } else {
            ptr::null_mut()
        };
        // SAFETY: `name` is NUL-terminated and outlives the call.
        handle(unsafe { ffi::sl_FsOpen(name.as_ptr(), flags.bits(), token_ptr) })
    }

    fn read(&mut self, handle: FileHandle, offset: u32, buf: &mut [u8]) -> Result<usize, VendorError> {
        let len = c_len(buf.len())?;
        // SAFETY: `buf` is valid for `len` bytes of writes.
        count(unsafe { ffi::sl_FsRead(handle.0, offset, buf.as_mut_ptr(), len) })
    }

    fn write(&mut self, handle: FileHandle, offset: u32, data: &[u8]) -> Result<usize, VendorError> {
        let len = c_len(data.len())?;
        // SAFETY: the vendor API takes a mutable pointer but only reads `len` bytes.
        count(unsafe { ffi::sl_FsWrite(handle.0, offset, data.as_ptr() as *mut u8, len) })
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), VendorError> {
        // SAFETY: no certificate and no signature.
        status(unsafe { ffi::sl_FsClose(handle.0, ptr::null(), ptr::null(), 0) })
    }

    fn delete(&mut self, name: &str) -> Result<(), VendorError> {
        let name = c_name(name)?;
        // SAFETY: `name` is NUL-terminated and outlives the call.
        status(unsafe { ffi::sl_FsDel(name.as_ptr(), 0) })
    }
}

/// The SDK's `OtaArchive` decoder.
///
/// `N` is the size of the decoder context in bytes. The SDK writes
/// `sizeof(OtaArchive_t)` bytes into it, which depends on the SDK release the
/// firmware links against.
#[repr(C, align(8))]
pub struct OtaArchive<const N: usize> {
    context: [u8; N],
}

impl<const N: usize> OtaArchive<N> {
    /// # Safety
    ///
    /// `N` must be at least `sizeof(OtaArchive_t)` of the linked SDK. A
    /// smaller context lets `OtaArchive_init` and `OtaArchive_process` write
    /// past the end of the buffer.
    pub const unsafe fn new() -> Self {
        Self { context: [0u8; N] }
    }

    fn context(&mut self) -> *mut c_void {
        self.context.as_mut_ptr().cast()
    }
}

impl<const N: usize> ArchiveDecoder for OtaArchive<N> {
    fn init(&mut self) -> Result<(), VendorError> {
        // SAFETY: `new` requires the context to hold an `OtaArchive_t`.
        archive_init(unsafe { ffi::OtaArchive_init(self.context()) })
    }

    fn process(&mut self, chunk: &[u8]) -> Result<Processed, VendorError> {
        let len = i16::try_from(chunk.len()).map_err(|_| VendorError::INVALID_ARGUMENT)?;
        let mut processed: i16 = 0;
        // SAFETY: `new` requires the context to hold an `OtaArchive_t`, and
        // the decoder reads at most `len` bytes from `chunk`.
        let status = unsafe {
            ffi::OtaArchive_process(
                self.context(),
                chunk.as_ptr() as *mut u8,
                len,
                &mut processed,
            )
        };
        archive_step(status, processed)
    }
}
