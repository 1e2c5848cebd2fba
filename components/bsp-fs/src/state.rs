use core::fmt;

/// Every outcome an adapter call can report to the SDK's firmware-update logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsState {
    Ok,
    OpenError,
    /// The resource was opened, but with read access only.
    OpenReadOnly,
    ReadError,
    WriteError,
    CloseError,
    RemoveError,
    NotImplemented,
}

impl fmt::Display for FsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FsState::Ok => "ok",
            FsState::OpenError => "open error",
            FsState::OpenReadOnly => "opened read-only",
            FsState::ReadError => "read error",
            FsState::WriteError => "write error",
            FsState::CloseError => "close error",
            FsState::RemoveError => "remove error",
            FsState::NotImplemented => "not implemented",
        };
        f.write_str(msg)
    }
}

/// The failing subset of [`FsState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsError {
    OpenErr,
    ReadErr,
    WriteErr,
    CloseErr,
    RemoveErr,
}

impl From<FsError> for FsState {
    fn from(error: FsError) -> Self {
        match error {
            FsError::OpenErr => Self::OpenError,
            FsError::ReadErr => Self::ReadError,
            FsError::WriteErr => Self::WriteError,
            FsError::CloseErr => Self::CloseError,
            FsError::RemoveErr => Self::RemoveError,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        FsState::from(*self).fmt(f)
    }
}

pub type Result<T, E = FsError> = core::result::Result<T, E>;

/// Raw negative status returned by a vendor call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VendorError(pub i32);

impl VendorError {
    /// Same value as SimpleLink's `SL_ERROR_BSD_EINVAL`.
    pub const INVALID_ARGUMENT: Self = Self(-22);
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vendor status {}", self.0)
    }
}

/// Vendor entry points the adapter calls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VendorOp {
    Open,
    Read,
    Write,
    Close,
    Delete,
    ArchiveInit,
    ArchiveProcess,
}

impl VendorOp {
    /// Maps a failed vendor call onto the adapter taxonomy.
    ///
    /// The vendor status value itself is never interpreted: any failure of a
    /// given entry point lands on the same error kind.
    pub const fn failure(self) -> FsError {
        match self {
            VendorOp::Open | VendorOp::ArchiveInit => FsError::OpenErr,
            VendorOp::Read => FsError::ReadErr,
            VendorOp::Write | VendorOp::ArchiveProcess => FsError::WriteErr,
            VendorOp::Close => FsError::CloseErr,
            VendorOp::Delete => FsError::RemoveErr,
        }
    }
}
