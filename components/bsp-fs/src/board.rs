use crate::boot_info::{MAX_WATCHDOG_TIMEOUT_SECS, WATCHDOG_TICKS_PER_SEC};

/// Resource name the IoT SDK uses for firmware update images.
pub const FIRMWARE_RESOURCE_NAME: &str = "firmware.bin";

pub trait Board {
    const BOARD_NAME: &'static str;

    /// Boot-critical files: opened read-only, never removed.
    const RESERVED_FILES: &'static [&'static str];

    /// File the bootloader reads the [`BootInfo`](crate::BootInfo) record from.
    const BOOT_INFO_FILE: &'static str;

    const WATCHDOG_TIMEOUT_SECS: u32;

    /// Whether `name` is the firmware update target rather than a stored file.
    fn is_firmware(&self, name: &str) -> bool;

    fn is_reserved(&self, name: &str) -> bool {
        Self::RESERVED_FILES.contains(&name)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Cc3220sf;

impl Board for Cc3220sf {
    const BOARD_NAME: &'static str = "CC3220SF";
    const RESERVED_FILES: &'static [&'static str] =
        &["/sys/mcuimg.bin", "/codecert", "/sys/mcubootinfo.bin"];
    const BOOT_INFO_FILE: &'static str = "/sys/mcubootinfo.bin";
    const WATCHDOG_TIMEOUT_SECS: u32 = 50;

    fn is_firmware(&self, name: &str) -> bool {
        name == FIRMWARE_RESOURCE_NAME
    }
}

/// Run-time adapter settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    watchdog_timeout_secs: u32,
}

impl Config {
    pub const fn new(watchdog_timeout_secs: u32) -> Self {
        match Self::try_new(watchdog_timeout_secs) {
            Some(config) => config,
            None => panic!("watchdog timeout must be between 1 and 107 seconds"),
        }
    }

    pub const fn try_new(watchdog_timeout_secs: u32) -> Option<Self> {
        if watchdog_timeout_secs == 0 || watchdog_timeout_secs > MAX_WATCHDOG_TIMEOUT_SECS {
            None
        } else {
            Some(Self {
                watchdog_timeout_secs,
            })
        }
    }

    pub const fn for_board<B: Board>() -> Self {
        Self::new(B::WATCHDOG_TIMEOUT_SECS)
    }

    pub const fn watchdog_timeout_secs(&self) -> u32 {
        self.watchdog_timeout_secs
    }

    pub const fn watchdog_ticks(&self) -> u32 {
        self.watchdog_timeout_secs * WATCHDOG_TICKS_PER_SEC
    }
}
