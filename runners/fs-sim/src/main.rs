mod archive;
mod flash;

use std::{
    fmt, fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    process::ExitCode,
};

use bsp_fs::{
    Board, BootInfo, Cc3220sf, Config, FsAdapter, FsError, OpenMode, OpenStatus,
    FIRMWARE_RESOURCE_NAME, MAX_WATCHDOG_TIMEOUT_SECS,
};
use clap::{Parser, Subcommand};
use log::{info, warn};

use archive::ImageSink;
use flash::{FileStore, HostFlash, SharedStore};

/// Where the image sink stores a received firmware image.
const DEFAULT_IMAGE_TARGET: &str = "/sys/mcuimg.bin";

const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Host simulation of the CC3220SF filesystem adapter.
///
/// Every command drives the adapter the way the IoT SDK does on the device:
/// open, a sequence of reads or writes, close.
#[derive(Parser, Debug)]
#[clap(about, author, version)]
struct Args {
    /// Directory backing the flash filesystem (default: use RAM).
    #[clap(short, long)]
    storage: Option<PathBuf>,

    /// Resource name that opens the firmware pseudo-file.
    #[clap(short, long, default_value = FIRMWARE_RESOURCE_NAME)]
    firmware_name: String,

    /// Bootloader watchdog timeout armed by firmware updates, in seconds.
    #[clap(short, long, value_parser = parse_watchdog_timeout, default_value_t = Cc3220sf::WATCHDOG_TIMEOUT_SECS)]
    watchdog: u32,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a host file under NAME.
    Put {
        name: String,
        source: PathBuf,
        /// Bytes per write call.
        #[clap(short, long, value_parser = parse_chunk_size, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk: usize,
    },
    /// Print the content of NAME to stdout.
    Get { name: String },
    /// Delete NAME.
    Rm { name: String },
    /// List stored files with their size and reservation.
    Ls,
    /// Stream IMAGE through the firmware pseudo-file.
    Ota {
        image: PathBuf,
        /// Bytes per write call.
        #[clap(short, long, value_parser = parse_chunk_size, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk: usize,
        /// File the received image is stored as.
        #[clap(short, long, default_value = DEFAULT_IMAGE_TARGET)]
        target: String,
    },
}

fn parse_watchdog_timeout(s: &str) -> Result<u32, String> {
    clap_num::number_range(s, 1, MAX_WATCHDOG_TIMEOUT_SECS)
}

fn parse_chunk_size(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 1, usize::MAX)
}

/// CC3220SF with a configurable firmware target name.
struct SimBoard {
    firmware_name: String,
}

impl Board for SimBoard {
    const BOARD_NAME: &'static str = Cc3220sf::BOARD_NAME;
    const RESERVED_FILES: &'static [&'static str] = Cc3220sf::RESERVED_FILES;
    const BOOT_INFO_FILE: &'static str = Cc3220sf::BOOT_INFO_FILE;
    const WATCHDOG_TIMEOUT_SECS: u32 = Cc3220sf::WATCHDOG_TIMEOUT_SECS;

    fn is_firmware(&self, name: &str) -> bool {
        name == self.firmware_name
    }
}

type Adapter = FsAdapter<SimBoard, HostFlash, ImageSink>;

#[derive(Debug)]
enum Error {
    Io(PathBuf, io::Error),
    Fs(FsError),
    IncompleteImage { received: usize, expected: usize },
}

impl From<FsError> for Error {
    fn from(err: FsError) -> Self {
        Self::Fs(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "{}: {}", path.display(), err),
            Self::Fs(err) => write!(f, "adapter error: {}", err),
            Self::IncompleteImage { received, expected } => write!(
                f,
                "image incomplete: decoder took {} of {} bytes",
                received, expected
            ),
        }
    }
}

/// Outcome of writing a whole buffer through one open handle.
#[derive(Debug, PartialEq, Eq)]
struct Upload {
    written: usize,
    archive_done: bool,
}

struct Simulator {
    store: SharedStore,
    firmware_name: String,
    config: Config,
}

impl Simulator {
    fn adapter(&self, sink: ImageSink) -> Adapter {
        let board = SimBoard {
            firmware_name: self.firmware_name.clone(),
        };
        FsAdapter::with_config(board, HostFlash::new(self.store.clone()), sink, self.config)
    }

    fn sink(&self, target: &str, expected: usize) -> ImageSink {
        ImageSink::new(self.store.clone(), target, expected)
    }

    fn put(&self, name: &str, data: &[u8], chunk: usize) -> Result<(), Error> {
        let mut adapter = self.adapter(self.sink(DEFAULT_IMAGE_TARGET, data.len()));
        let upload = upload(&mut adapter, name, data, chunk)?;
        info!("wrote {} bytes to {}", upload.written, name);
        Ok(())
    }

    fn ota(&self, image: &[u8], chunk: usize, target: &str) -> Result<(), Error> {
        let mut adapter = self.adapter(self.sink(target, image.len()));
        let upload = upload(&mut adapter, &self.firmware_name, image, chunk)?;
        if !upload.archive_done {
            return Err(Error::IncompleteImage {
                received: upload.written,
                expected: image.len(),
            });
        }
        info!("firmware image of {} bytes accepted", upload.written);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, Error> {
        let mut adapter = self.adapter(self.sink(DEFAULT_IMAGE_TARGET, 0));
        let content = download(&mut adapter, name)?;
        if name == SimBoard::BOOT_INFO_FILE {
            if let Ok(record) = <&[u8; BootInfo::SIZE]>::try_from(content.as_slice()) {
                let info = BootInfo::from_bytes(record);
                info!(
                    "boot info: image {}, status {:#x}, watchdog {} ({} s)",
                    info.active_image,
                    info.image_status,
                    if info.is_armed() { "armed" } else { "off" },
                    info.timeout_secs()
                );
            }
        }
        Ok(content)
    }

    fn rm(&self, name: &str) -> Result<(), Error> {
        let mut adapter = self.adapter(self.sink(DEFAULT_IMAGE_TARGET, 0));
        adapter.remove(name)?;
        info!("deleted {}", name);
        Ok(())
    }
}

fn upload(adapter: &mut Adapter, name: &str, data: &[u8], chunk: usize) -> Result<Upload, Error> {
    let (resource, status) = adapter.open(name, data.len(), OpenMode::Write)?;
    if status == OpenStatus::ReadOnly {
        warn!("{} was opened read-only", name);
    }

    let mut written = 0;
    let mut result = Ok(());
    for part in data.chunks(chunk) {
        match adapter.write(resource, part, written as u32) {
            Ok(len) => written += len,
            Err(err) => {
                result = Err(err);
                break;
            }
        }
    }
    let archive_done = adapter.is_archive_done();
    let closed = adapter.close(resource);

    result?;
    closed?;
    Ok(Upload {
        written,
        archive_done,
    })
}

fn download(adapter: &mut Adapter, name: &str) -> Result<Vec<u8>, Error> {
    let (resource, _) = adapter.open(name, 0, OpenMode::Read)?;

    let mut content = Vec::new();
    let result = loop {
        match adapter.read(resource, content.len() as u32) {
            Ok(chunk) if chunk.is_empty() => break Ok(()),
            Ok(chunk) => content.extend_from_slice(chunk),
            Err(err) => break Err(err),
        }
    };
    let closed = adapter.close(resource);

    result?;
    closed?;
    Ok(content)
}

fn read_host_file(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|err| Error::Io(path.to_owned(), err))
}

fn run(args: Args) -> Result<(), Error> {
    let store = match args.storage {
        Some(root) => FileStore::load(root.clone()).map_err(|err| Error::Io(root, err))?,
        None => FileStore::ram(),
    };
    let sim = Simulator {
        store: store.shared(),
        firmware_name: args.firmware_name,
        // the argument parser enforces the timeout range
        config: Config::new(args.watchdog),
    };

    match args.command {
        Command::Put {
            name,
            source,
            chunk,
        } => sim.put(&name, &read_host_file(&source)?, chunk),
        Command::Get { name } => {
            let content = sim.get(&name)?;
            io::stdout()
                .write_all(&content)
                .map_err(|err| Error::Io(PathBuf::from("<stdout>"), err))
        }
        Command::Rm { name } => sim.rm(&name),
        Command::Ls => {
            let store = sim.store.borrow();
            for name in store.names() {
                if let Some(file) = store.get(name) {
                    println!("{:>8} {:>8}  {}", file.data.len(), file.max_size, name);
                }
            }
            Ok(())
        }
        Command::Ota {
            image,
            chunk,
            target,
        } => sim.ota(&read_host_file(&image)?, chunk, &target),
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
