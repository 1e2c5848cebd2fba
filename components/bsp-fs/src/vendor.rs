//! Translation of raw SimpleLink and OtaArchive return values.

use heapless::Vec;

use crate::{
    backend::{FileHandle, Processed, Progress},
    state::VendorError,
};

/// Longest file name `sl_FsOpen` accepts, without the terminating NUL.
pub const MAX_FILE_NAME_LEN: usize = 180;

/// `OtaArchive_process` status once the whole archive has been consumed.
const ARCHIVE_DONE: i16 = 1;

pub(crate) type CName = Vec<u8, { MAX_FILE_NAME_LEN + 1 }>;

/// NUL-terminated copy of `name`.
pub(crate) fn c_name(name: &str) -> Result<CName, VendorError> {
    if name.as_bytes().contains(&0) {
        return Err(VendorError::INVALID_ARGUMENT);
    }
    let mut c_name = Vec::new();
    c_name
        .extend_from_slice(name.as_bytes())
        .map_err(|_| VendorError::INVALID_ARGUMENT)?;
    c_name
        .push(0)
        .map_err(|_| VendorError::INVALID_ARGUMENT)?;
    Ok(c_name)
}

pub(crate) fn c_len(len: usize) -> Result<u32, VendorError> {
    u32::try_from(len).map_err(|_| VendorError::INVALID_ARGUMENT)
}

pub(crate) fn handle(status: i32) -> Result<FileHandle, VendorError> {
    if status < 0 {
        Err(VendorError(status))
    } else {
        Ok(FileHandle(status))
    }
}

pub(crate) fn count(status: i32) -> Result<usize, VendorError> {
    if status < 0 {
        Err(VendorError(status))
    } else {
        Ok(status as usize)
    }
}

pub(crate) fn status(status: i16) -> Result<(), VendorError> {
    if status == 0 {
        Ok(())
    } else {
        Err(VendorError(status.into()))
    }
}

pub(crate) fn archive_init(status: i16) -> Result<(), VendorError> {
    if status < 0 {
        Err(VendorError(status.into()))
    } else {
        Ok(())
    }
}

pub(crate) fn archive_step(status: i16, processed: i16) -> Result<Processed, VendorError> {
    if status < 0 {
        return Err(VendorError(status.into()));
    }
    let progress = if status == ARCHIVE_DONE {
        Progress::Done
    } else {
        Progress::Continue
    };
    Ok(Processed {
        consumed: processed.max(0) as usize,
        progress,
    })
}
