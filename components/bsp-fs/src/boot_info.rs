/// Key the bootloader expects before it starts the image watchdog.
pub const WATCHDOG_START_KEY: u32 = 0xAE42_DB15;

/// Watchdog ticks per second of timeout.
pub const WATCHDOG_TICKS_PER_SEC: u32 = 40_000_000;

/// Longest timeout whose tick count still fits the record.
pub const MAX_WATCHDOG_TIMEOUT_SECS: u32 = u32::MAX / WATCHDOG_TICKS_PER_SEC;

/// Boot info record read by the bootloader from the boot-info file.
///
/// Stored as the C struct it is on the device: one byte active image index,
/// three bytes of padding, then three little-endian `u32`s.
///
/// | bytes   | content             |
/// |---------|---------------------|
/// |  0      | active image        |
/// |  1 - 3  | zero padding        |
/// |  4 - 7  | image status        |
/// |  8 - 11 | watchdog start key  |
/// | 12 - 15 | watchdog timeout    |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BootInfo {
    pub active_image: u8,
    pub image_status: u32,
    pub watchdog_key: u32,
    pub watchdog_ticks: u32,
}

impl BootInfo {
    pub const SIZE: usize = 16;

    /// Record that starts the watchdog with `watchdog_ticks` on the next boot.
    pub const fn armed(watchdog_ticks: u32) -> Self {
        Self {
            active_image: 0,
            image_status: 0,
            watchdog_key: WATCHDOG_START_KEY,
            watchdog_ticks,
        }
    }

    pub const fn is_armed(&self) -> bool {
        self.watchdog_key == WATCHDOG_START_KEY
    }

    pub const fn timeout_secs(&self) -> u32 {
        self.watchdog_ticks / WATCHDOG_TICKS_PER_SEC
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.active_image;
        bytes[4..8].copy_from_slice(&self.image_status.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.watchdog_key.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.watchdog_ticks.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let word = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Self {
            active_image: bytes[0],
            image_status: word(4),
            watchdog_key: word(8),
            watchdog_ticks: word(12),
        }
    }
}
