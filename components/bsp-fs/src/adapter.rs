use crate::{
    backend::{ArchiveDecoder, FileHandle, FlashFs},
    board::{Board, Config},
    boot_info::BootInfo,
    flags::{OpenFlags, OpenMode},
    session::OtaSession,
    state::{FsError, FsState, Result, VendorOp},
};

/// Size of the buffer [`FsAdapter::read`] fills.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Integer handle the SDK sees for the firmware pseudo-file.
pub const FIRMWARE_HANDLE: i32 = -1;

/// What an open call handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// A file in the flash filesystem.
    File(FileHandle),
    /// The firmware pseudo-file, backed by the archive decoder.
    Firmware,
}

impl Resource {
    pub const fn raw(self) -> i32 {
        match self {
            Resource::File(handle) => handle.0,
            Resource::Firmware => FIRMWARE_HANDLE,
        }
    }

    pub const fn from_raw(raw: i32) -> Self {
        if raw == FIRMWARE_HANDLE {
            Resource::Firmware
        } else {
            Resource::File(FileHandle(raw))
        }
    }
}

/// Successful open outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenStatus {
    Ok,
    /// Write access was requested on a reserved file and dropped.
    ReadOnly,
}

impl From<OpenStatus> for FsState {
    fn from(status: OpenStatus) -> Self {
        match status {
            OpenStatus::Ok => Self::Ok,
            OpenStatus::ReadOnly => Self::OpenReadOnly,
        }
    }
}

/// Filesystem adapter for the SDK's firmware-update logic.
///
/// Ordinary names go to the flash filesystem. The board's firmware target
/// name opens a write-only pseudo-file whose content is streamed into the
/// archive decoder; only one such session can be open at a time.
///
/// The adapter is not reentrant. All calls must come from one execution
/// context, and a buffer returned by [`read`](Self::read) must be consumed
/// before the next call.
pub struct FsAdapter<B, F, A> {
    board: B,
    fs: F,
    archive: A,
    config: Config,
    session: Option<OtaSession>,
    read_buf: [u8; READ_BUFFER_SIZE],
}

impl<B: Board, F: FlashFs, A: ArchiveDecoder> FsAdapter<B, F, A> {
    pub fn new(board: B, fs: F, archive: A) -> Self {
        Self::with_config(board, fs, archive, Config::for_board::<B>())
    }

    pub fn with_config(board: B, fs: F, archive: A, config: Config) -> Self {
        Self {
            board,
            fs,
            archive,
            config,
            session: None,
            read_buf: [0u8; READ_BUFFER_SIZE],
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// Whether a firmware pseudo-file is currently open.
    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the open firmware session has seen the end of the archive.
    pub fn is_archive_done(&self) -> bool {
        self.session.as_ref().map_or(false, OtaSession::is_done)
    }

    pub fn into_parts(self) -> (B, F, A) {
        (self.board, self.fs, self.archive)
    }

    /// Opens `name`.
    ///
    /// `size` is the reservation made for files created with
    /// [`OpenMode::Write`]. Reserved board files are silently downgraded to
    /// read access, reported as [`OpenStatus::ReadOnly`].
    pub fn open(&mut self, name: &str, size: usize, mode: OpenMode) -> Result<(Resource, OpenStatus)> {
        debug!("opening {} with mode {:?}", name, mode);

        if self.board.is_firmware(name) {
            self.open_firmware()?;
            return Ok((Resource::Firmware, OpenStatus::Ok));
        }

        let desired = mode.vendor_flags(size);
        let access = if self.board.is_reserved(name) {
            OpenFlags::READ
        } else {
            desired
        };

        let handle = self.fs.open(name, access).map_err(|_err| {
            error!("failed to open {} with error {}", name, _err.0);
            VendorOp::Open.failure()
        })?;
        debug!("opened {} with handle {}", name, handle.0);

        let status = if access == desired {
            OpenStatus::Ok
        } else {
            info!("{} is a {} firmware file, opened read-only", name, B::BOARD_NAME);
            OpenStatus::ReadOnly
        };
        Ok((Resource::File(handle), status))
    }

    /// Reads up to [`READ_BUFFER_SIZE`] bytes at `offset`.
    pub fn read(&mut self, resource: Resource, offset: u32) -> Result<&[u8]> {
        debug!("reading from handle {} at {}", resource.raw(), offset);

        if self.is_stream(resource) {
            // the archive is decoded, never stored
            info!("can't read from the archive file");
            return Err(FsError::ReadErr);
        }
        let handle = file_handle(resource);

        let len = self
            .fs
            .read(handle, offset, &mut self.read_buf)
            .map_err(|_err| {
                error!("read from handle {} failed with error {}", handle.0, _err.0);
                VendorOp::Read.failure()
            })?;
        Ok(&self.read_buf[..len.min(READ_BUFFER_SIZE)])
    }

    /// Writes `data`, returning the number of bytes taken.
    ///
    /// For the firmware pseudo-file `offset` is ignored and the count is what
    /// the decoder consumed, which is less than `data.len()` once the archive
    /// is complete. Ordinary files must take all of `data`.
    pub fn write(&mut self, resource: Resource, data: &[u8], offset: u32) -> Result<usize> {
        debug!("writing {} bytes to handle {}", data.len(), resource.raw());

        if resource == Resource::Firmware {
            if let Some(session) = self.session.as_mut() {
                return session.feed(&mut self.archive, data);
            }
        }

        let handle = file_handle(resource);
        let written = self.fs.write(handle, offset, data).map_err(|_err| {
            error!("write to handle {} failed with error {}", handle.0, _err.0);
            VendorOp::Write.failure()
        })?;
        if written == data.len() {
            Ok(written)
        } else {
            error!("short write: {} of {} bytes", written, data.len());
            Err(FsError::WriteErr)
        }
    }

    pub fn close(&mut self, resource: Resource) -> Result<()> {
        debug!("closing handle {}", resource.raw());

        if resource == Resource::Firmware {
            if let Some(_session) = self.session.take() {
                info!("firmware session closed after {} bytes", _session.consumed());
                return Ok(());
            }
        }

        let handle = file_handle(resource);
        self.fs.close(handle).map_err(|_err| {
            error!("close of handle {} failed with error {}", handle.0, _err.0);
            VendorOp::Close.failure()
        })
    }

    /// Deletes `name`. Reserved board files are never deleted.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        debug!("deleting {}", name);

        if self.board.is_reserved(name) {
            error!("refusing to delete {} firmware file {}", B::BOARD_NAME, name);
            return Err(FsError::RemoveErr);
        }

        self.fs.delete(name).map_err(|_err| {
            error!("delete of {} failed with error {}", name, _err.0);
            VendorOp::Delete.failure()
        })
    }

    fn is_stream(&self, resource: Resource) -> bool {
        resource == Resource::Firmware && self.session.is_some()
    }

    fn open_firmware(&mut self) -> Result<()> {
        if self.session.is_some() {
            error!("firmware session already open");
            return Err(FsError::OpenErr);
        }

        self.arm_watchdog().map_err(|_err| {
            error!("arming the boot watchdog failed: {}", _err);
            FsError::OpenErr
        })?;

        self.archive.init().map_err(|_err| {
            error!("archive initialization failed, status: {}", _err.0);
            VendorOp::ArchiveInit.failure()
        })?;
        info!("initialized the archive decoder");

        self.session = Some(OtaSession::default());
        Ok(())
    }

    /// Writes a boot info record that makes the bootloader guard the next
    /// boot with its watchdog.
    fn arm_watchdog(&mut self) -> Result<()> {
        let record = BootInfo::armed(self.config.watchdog_ticks()).to_bytes();
        let flags = OpenFlags::CREATE
            | OpenFlags::OVERWRITE
            | OpenFlags::CREATE_SECURE
            | OpenFlags::CREATE_NOSIGNATURE
            | OpenFlags::CREATE_PUBLIC_WRITE
            | OpenFlags::max_size(BootInfo::SIZE);

        let handle = self
            .fs
            .open(B::BOOT_INFO_FILE, flags)
            .map_err(|_| VendorOp::Open.failure())?;
        let written = self.fs.write(handle, 0, &record);
        let closed = self.fs.close(handle);

        match written {
            Ok(len) if len == record.len() => {}
            _ => return Err(VendorOp::Write.failure()),
        }
        closed.map_err(|_| VendorOp::Close.failure())?;

        debug!(
            "boot watchdog armed for {} s",
            self.config.watchdog_timeout_secs()
        );
        Ok(())
    }
}

/// Filesystem handle for a resource that isn't an open firmware stream.
///
/// A stale firmware handle reaches the filesystem as the plain integer.
const fn file_handle(resource: Resource) -> FileHandle {
    FileHandle(resource.raw())
}
