#![cfg_attr(not(test), no_std)]
#![warn(trivial_casts, unused, unused_qualifications)]

//! Board filesystem adapter for the CC3220SF.
//!
//! The IoT SDK's firmware-update logic talks to storage through a small,
//! handle based file API (open/read/write/close/remove). This component
//! implements that API on top of two vendor services:
//!
//! * the SimpleLink flash filesystem, for ordinary named files, and
//! * the OTA archive decoder, for the *firmware* pseudo-file.
//!
//! Both are traits ([`FlashFs`], [`ArchiveDecoder`]) so the adapter can run
//! against the real SDK (feature `cc3220sf`) or against host doubles.
//!
//! # Firmware pseudo-file
//! Opening the board's firmware target name (see [`Board::is_firmware`]) does
//! not touch a stored file. Instead the adapter
//!
//! 1. writes a [`BootInfo`] record to the boot-info file, arming the
//!    bootloader watchdog for the next boot,
//! 2. initializes the archive decoder, and
//! 3. hands out [`Resource::Firmware`].
//!
//! Writes to that resource are fed to the decoder in chunks of at most
//! [`ARCHIVE_CHUNK_SIZE`] bytes until the decoder reports the archive
//! complete. The resource can't be read back.
//!
//! # Reserved files
//! | name                   | open          | remove   |
//! |------------------------|---------------|----------|
//! | `/sys/mcuimg.bin`      | read-only     | rejected |
//! | `/codecert`            | read-only     | rejected |
//! | `/sys/mcubootinfo.bin` | read-only     | rejected |
//!
//! Write access requested on a reserved file is dropped and reported as
//! [`OpenStatus::ReadOnly`], which is a success.

delog::generate_macros!();

mod adapter;
mod backend;
mod board;
mod boot_info;
mod flags;
mod session;
mod state;
#[cfg_attr(not(feature = "cc3220sf"), allow(dead_code))]
mod vendor;

#[cfg(feature = "cc3220sf")]
mod simplelink;

pub use crate::adapter::{FsAdapter, OpenStatus, Resource, FIRMWARE_HANDLE, READ_BUFFER_SIZE};
pub use crate::backend::{ArchiveDecoder, FileHandle, FlashFs, Processed, Progress};
pub use crate::board::{Board, Cc3220sf, Config, FIRMWARE_RESOURCE_NAME};
pub use crate::boot_info::{
    BootInfo, MAX_WATCHDOG_TIMEOUT_SECS, WATCHDOG_START_KEY, WATCHDOG_TICKS_PER_SEC,
};
pub use crate::flags::{Access, OpenFlags, OpenMode, MAX_SIZE_GRANULE};
pub use crate::session::ARCHIVE_CHUNK_SIZE;
pub use crate::state::{FsError, FsState, Result, VendorError, VendorOp};
pub use crate::vendor::MAX_FILE_NAME_LEN;

#[cfg(feature = "cc3220sf")]
pub use crate::simplelink::{OtaArchive, SimpleLinkFs};
