use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use bsp_fs::{Access, FileHandle, FlashFs, OpenFlags, VendorError, MAX_SIZE_GRANULE};
use log::{debug, warn};

pub const ERR_FILE_NOT_FOUND: VendorError = VendorError(-11);
pub const ERR_INVALID_HANDLE: VendorError = VendorError(-12);
pub const ERR_ACCESS_DENIED: VendorError = VendorError(-13);
pub const ERR_NO_SPACE: VendorError = VendorError(-14);
pub const ERR_FILE_IN_USE: VendorError = VendorError(-15);
pub const ERR_NO_RESERVATION: VendorError = VendorError(-16);
pub const ERR_IO: VendorError = VendorError(-17);
pub const ERR_INVALID_NAME: VendorError = VendorError(-18);
pub const ERR_FILE_EXISTS: VendorError = VendorError(-19);

/// Names may not step out of the store, so `..` is never a path component.
fn is_valid_name(name: &str) -> bool {
    !name.split('/').any(|component| component == "..")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredFile {
    pub data: Vec<u8>,
    pub max_size: usize,
}

impl StoredFile {
    fn loaded(data: Vec<u8>) -> Self {
        let max_size = data.len().div_ceil(MAX_SIZE_GRANULE) * MAX_SIZE_GRANULE;
        Self { data, max_size }
    }
}

/// File contents shared by the simulated flash and the image sink.
///
/// With a root directory every change is mirrored to the host, a file named
/// `/sys/mcuimg.bin` living at `<root>/sys/mcuimg.bin`.
#[derive(Debug, Default)]
pub struct FileStore {
    files: BTreeMap<String, StoredFile>,
    root: Option<PathBuf>,
}

pub type SharedStore = Rc<RefCell<FileStore>>;

impl FileStore {
    pub fn ram() -> Self {
        Self::default()
    }

    pub fn load(root: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&root)?;
        let mut files = BTreeMap::new();
        collect(&root, &root, &mut files)?;
        debug!("loaded {} files from {}", files.len(), root.display());
        Ok(Self {
            files,
            root: Some(root),
        })
    }

    pub fn shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    pub fn get(&self, name: &str) -> Option<&StoredFile> {
        self.files.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, file: StoredFile) -> io::Result<()> {
        if let Some(path) = self.host_path(name)? {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &file.data)?;
        }
        self.files.insert(name.to_owned(), file);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> io::Result<Option<StoredFile>> {
        let path = self.host_path(name)?;
        let file = self.files.remove(name);
        if file.is_some() {
            if let Some(path) = path {
                fs::remove_file(path)?;
            }
        }
        Ok(file)
    }

    fn host_path(&self, name: &str) -> io::Result<Option<PathBuf>> {
        if !is_valid_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name {}", name),
            ));
        }
        Ok(self
            .root
            .as_ref()
            .map(|root| root.join(name.trim_start_matches('/'))))
    }
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<String, StoredFile>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(root, &path, files)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let Some(relative) = relative.to_str() else {
            warn!("skipping non UTF-8 path {}", path.display());
            continue;
        };
        let name = format!("/{}", relative.replace(std::path::MAIN_SEPARATOR, "/"));
        files.insert(name, StoredFile::loaded(fs::read(&path)?));
    }
    Ok(())
}

#[derive(Debug)]
struct OpenFile {
    name: String,
    writable: bool,
    /// contents as seen through this handle, committed on close
    file: StoredFile,
}

/// SimpleLink flash filesystem emulation.
///
/// Writes go to a per-handle copy that reaches the store when the handle is
/// closed. A file can only be opened once at a time.
#[derive(Debug)]
pub struct HostFlash {
    store: SharedStore,
    handles: BTreeMap<i32, OpenFile>,
    next_handle: i32,
}

impl HostFlash {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            handles: BTreeMap::new(),
            next_handle: 1,
        }
    }

    #[cfg(test)]
    fn open_handles(&self) -> usize {
        self.handles.len()
    }

    fn handle(&mut self, handle: FileHandle) -> Result<&mut OpenFile, VendorError> {
        self.handles.get_mut(&handle.0).ok_or(ERR_INVALID_HANDLE)
    }
}

impl FlashFs for HostFlash {
    fn open(&mut self, name: &str, flags: OpenFlags) -> Result<FileHandle, VendorError> {
        if !is_valid_name(name) {
            return Err(ERR_INVALID_NAME);
        }
        if self.handles.values().any(|open| open.name == name) {
            return Err(ERR_FILE_IN_USE);
        }

        let existing = self.store.borrow().get(name).cloned();
        let created = || match flags.reserved_bytes() {
            0 => Err(ERR_NO_RESERVATION),
            max_size => Ok(StoredFile {
                data: Vec::new(),
                max_size,
            }),
        };
        let file = match (flags.access(), existing) {
            (None, _) => return Err(ERR_ACCESS_DENIED),
            (Some(Access::Read | Access::Write), Some(file)) => file,
            (Some(Access::Read | Access::Write), None) => return Err(ERR_FILE_NOT_FOUND),
            (Some(Access::Create), Some(_)) if !flags.contains(OpenFlags::OVERWRITE) => {
                return Err(ERR_FILE_EXISTS)
            }
            (Some(Access::Create), _) => created()?,
            (Some(Access::WriteBundle), Some(file)) => file,
            (Some(Access::WriteBundle), None) => created()?,
        };

        let handle = self.next_handle;
        self.next_handle += 1;
        debug!("{} opened as {} ({:?})", name, handle, flags);
        self.handles.insert(
            handle,
            OpenFile {
                name: name.to_owned(),
                writable: flags.is_writable(),
                file,
            },
        );
        Ok(FileHandle(handle))
    }

    fn read(&mut self, handle: FileHandle, offset: u32, buf: &mut [u8]) -> Result<usize, VendorError> {
        let data = &self.handle(handle)?.file.data;
        let start = (offset as usize).min(data.len());
        let len = buf.len().min(data.len() - start);
        buf[..len].copy_from_slice(&data[start..start + len]);
        Ok(len)
    }

    fn write(&mut self, handle: FileHandle, offset: u32, data: &[u8]) -> Result<usize, VendorError> {
        let open = self.handle(handle)?;
        if !open.writable {
            return Err(ERR_ACCESS_DENIED);
        }
        let start = offset as usize;
        let end = start + data.len();
        if end > open.file.max_size {
            return Err(ERR_NO_SPACE);
        }
        if open.file.data.len() < end {
            open.file.data.resize(end, 0xFF);
        }
        open.file.data[start..end].copy_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), VendorError> {
        let open = self.handles.remove(&handle.0).ok_or(ERR_INVALID_HANDLE)?;
        if !open.writable {
            return Ok(());
        }
        self.store
            .borrow_mut()
            .insert(&open.name, open.file)
            .map_err(|err| {
                warn!("failed to persist {}: {}", open.name, err);
                ERR_IO
            })
    }

    fn delete(&mut self, name: &str) -> Result<(), VendorError> {
        if !is_valid_name(name) {
            return Err(ERR_INVALID_NAME);
        }
        if self.handles.values().any(|open| open.name == name) {
            return Err(ERR_FILE_IN_USE);
        }
        match self.store.borrow_mut().remove(name) {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(ERR_FILE_NOT_FOUND),
            Err(err) => {
                warn!("failed to delete {}: {}", name, err);
                Err(ERR_IO)
            }
        }
    }
}
