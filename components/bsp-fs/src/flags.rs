use bitflags::bitflags;

const MAX_SIZE_BITS: u32 = 16;
const MAX_SIZE_MASK: u32 = (1 << MAX_SIZE_BITS) - 1;

const FLAGS_BITS: u32 = 12;
const MODE_SHIFT: u32 = MAX_SIZE_BITS + FLAGS_BITS;
const MODE_MASK: u32 = 0xF << MODE_SHIFT;

/// Unit of the max-size reservation encoded in [`OpenFlags`].
pub const MAX_SIZE_GRANULE: usize = 256;

/// Open mode field of an `sl_FsOpen` access word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read = 0,
    /// Write to an existing file.
    Write = 1,
    /// Create a new file, or replace one with [`OpenFlags::OVERWRITE`].
    Create = 2,
    /// Write, creating the file if needed.
    WriteBundle = 3,
}

bitflags! {
    /// `sl_FsOpen` access word, laid out as in the SimpleLink SDK's
    /// `ti/drivers/net/wifi/fs.h`:
    ///
    /// | bits    | content                                            |
    /// |---------|----------------------------------------------------|
    /// | 28 - 31 | open mode ([`Access`])                             |
    /// | 16 - 27 | creation flags                                     |
    /// |  0 - 15 | max size in [`MAX_SIZE_GRANULE`] units             |
    ///
    /// The mode is a number, not a set of bits. Use [`OpenFlags::access`]
    /// to inspect it; [`OpenFlags::READ`] is the empty word.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const CREATE_FAILSAFE = 0x1 << MAX_SIZE_BITS;
        const CREATE_SECURE = 0x2 << MAX_SIZE_BITS;
        const CREATE_NOSIGNATURE = 0x4 << MAX_SIZE_BITS;
        const CREATE_STATIC_TOKEN = 0x8 << MAX_SIZE_BITS;
        const CREATE_VENDOR_TOKEN = 0x10 << MAX_SIZE_BITS;
        const CREATE_PUBLIC_WRITE = 0x20 << MAX_SIZE_BITS;
        const CREATE_PUBLIC_READ = 0x40 << MAX_SIZE_BITS;
        const OVERWRITE = 0x80 << MAX_SIZE_BITS;

        const _ = MAX_SIZE_MASK | MODE_MASK;
    }
}

impl OpenFlags {
    pub const READ: Self = Self::with_access(Access::Read);
    pub const WRITE: Self = Self::with_access(Access::Write);
    pub const CREATE: Self = Self::with_access(Access::Create);
    pub const WRITE_BUNDLE_FILE: Self = Self::with_access(Access::WriteBundle);

    const fn with_access(access: Access) -> Self {
        Self::from_bits_retain((access as u32) << MODE_SHIFT)
    }

    /// The open mode, `None` for a value the SDK doesn't define.
    pub const fn access(&self) -> Option<Access> {
        match (self.bits() & MODE_MASK) >> MODE_SHIFT {
            0 => Some(Access::Read),
            1 => Some(Access::Write),
            2 => Some(Access::Create),
            3 => Some(Access::WriteBundle),
            _ => None,
        }
    }

    /// Max-size reservation for a file of `bytes`, rounded up to whole granules.
    pub const fn max_size(bytes: usize) -> Self {
        let granules =
            (bytes as u64).saturating_add(MAX_SIZE_GRANULE as u64 - 1) / MAX_SIZE_GRANULE as u64;
        Self::from_bits_retain(granules as u32 & MAX_SIZE_MASK)
    }

    /// Reserved size in bytes, zero if no reservation is encoded.
    pub const fn reserved_bytes(&self) -> usize {
        (self.bits() & MAX_SIZE_MASK) as usize * MAX_SIZE_GRANULE
    }

    /// Whether a handle opened with these flags may be written to.
    pub const fn is_writable(&self) -> bool {
        !matches!(self.access(), Some(Access::Read))
    }
}

/// Access requested by the SDK when opening an ordinary resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenMode {
    #[default]
    Read,
    /// Create or truncate, reserving the requested size.
    Write,
    /// Open an existing file for writing.
    Append,
}

impl OpenMode {
    pub const fn vendor_flags(self, size: usize) -> OpenFlags {
        match self {
            OpenMode::Write => OpenFlags::CREATE
                .union(OpenFlags::OVERWRITE)
                .union(OpenFlags::max_size(size)),
            OpenMode::Append => OpenFlags::WRITE,
            OpenMode::Read => OpenFlags::READ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_size_rounds_up_to_granules() {
        assert_eq!(OpenFlags::max_size(0).bits(), 0);
        assert_eq!(OpenFlags::max_size(1).bits(), 1);
        assert_eq!(OpenFlags::max_size(16).bits(), 1);
        assert_eq!(OpenFlags::max_size(256).bits(), 1);
        assert_eq!(OpenFlags::max_size(257).bits(), 2);
        assert_eq!(OpenFlags::max_size(4096).bits(), 16);
        assert_eq!(OpenFlags::max_size(4096).reserved_bytes(), 4096);
        assert_eq!(OpenFlags::max_size(usize::MAX).reserved_bytes(), 0xFFFF * 256);
    }

    #[test]
    fn max_size_survives_flag_union() {
        let flags = OpenFlags::CREATE | OpenFlags::max_size(1000);
        assert_eq!(flags.access(), Some(Access::Create));
        assert_eq!(flags.reserved_bytes(), 1024);
    }

    #[test]
    fn vendor_bit_layout() {
        assert_eq!(OpenFlags::READ.bits(), 0);
        assert!(OpenFlags::READ.is_empty());
        assert_eq!(OpenFlags::WRITE.bits(), 0x1000_0000);
        assert_eq!(OpenFlags::CREATE.bits(), 0x2000_0000);
        assert_eq!(OpenFlags::WRITE_BUNDLE_FILE.bits(), 0x3000_0000);

        assert_eq!(OpenFlags::CREATE_FAILSAFE.bits(), 0x0001_0000);
        assert_eq!(OpenFlags::CREATE_SECURE.bits(), 0x0002_0000);
        assert_eq!(OpenFlags::CREATE_NOSIGNATURE.bits(), 0x0004_0000);
        assert_eq!(OpenFlags::CREATE_PUBLIC_WRITE.bits(), 0x0020_0000);
        assert_eq!(OpenFlags::CREATE_PUBLIC_READ.bits(), 0x0040_0000);
        assert_eq!(OpenFlags::OVERWRITE.bits(), 0x0080_0000);
    }

    #[test]
    fn boot_info_open_word() {
        let flags = OpenFlags::CREATE
            | OpenFlags::OVERWRITE
            | OpenFlags::CREATE_SECURE
            | OpenFlags::CREATE_NOSIGNATURE
            | OpenFlags::CREATE_PUBLIC_WRITE
            | OpenFlags::max_size(16);
        assert_eq!(flags.bits(), 0x20A6_0001);
        assert_eq!(flags.access(), Some(Access::Create));
    }

    #[test]
    fn access_is_a_field() {
        assert_eq!(OpenFlags::READ.access(), Some(Access::Read));
        assert_eq!(OpenFlags::WRITE.access(), Some(Access::Write));
        assert_eq!(OpenFlags::WRITE_BUNDLE_FILE.access(), Some(Access::WriteBundle));
        assert_eq!(OpenFlags::from_bits_retain(0xF000_0000).access(), None);

        // creation flags never change the mode
        let secure_read = OpenFlags::READ | OpenFlags::CREATE_SECURE | OpenFlags::max_size(16);
        assert_eq!(secure_read.access(), Some(Access::Read));
        assert!(!secure_read.is_writable());
    }

    #[test]
    fn modes_translate_to_vendor_flags() {
        let write = OpenMode::Write.vendor_flags(100);
        assert_eq!(write.access(), Some(Access::Create));
        assert!(write.contains(OpenFlags::OVERWRITE));
        assert_eq!(write.reserved_bytes(), 256);
        assert!(write.is_writable());

        assert_eq!(OpenMode::Append.vendor_flags(100), OpenFlags::WRITE);
        assert!(OpenMode::Append.vendor_flags(0).is_writable());

        assert_eq!(OpenMode::Read.vendor_flags(100), OpenFlags::READ);
        assert!(!OpenMode::Read.vendor_flags(100).is_writable());
    }
}
