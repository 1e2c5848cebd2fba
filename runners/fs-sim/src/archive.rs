use bsp_fs::{ArchiveDecoder, Processed, Progress, VendorError, MAX_SIZE_GRANULE};
use log::{debug, info, warn};

use crate::flash::{SharedStore, StoredFile, ERR_IO};

pub const ERR_NOT_INITIALIZED: VendorError = VendorError(-20);

/// Stand-in for the vendor archive decoder.
///
/// Takes the incoming stream as a raw image of a known length and stores it
/// under `target` once the last byte has arrived.
#[derive(Debug)]
pub struct ImageSink {
    store: SharedStore,
    target: String,
    expected: usize,
    image: Option<Vec<u8>>,
}

impl ImageSink {
    pub fn new(store: SharedStore, target: impl Into<String>, expected: usize) -> Self {
        Self {
            store,
            target: target.into(),
            expected,
            image: None,
        }
    }

    fn commit(&mut self, image: Vec<u8>) -> Result<(), VendorError> {
        let max_size = image.len().div_ceil(MAX_SIZE_GRANULE) * MAX_SIZE_GRANULE;
        self.store
            .borrow_mut()
            .insert(
                &self.target,
                StoredFile {
                    data: image,
                    max_size,
                },
            )
            .map_err(|err| {
                warn!("failed to store image as {}: {}", self.target, err);
                ERR_IO
            })?;
        info!("stored {} byte image as {}", self.expected, self.target);
        Ok(())
    }
}

impl ArchiveDecoder for ImageSink {
    fn init(&mut self) -> Result<(), VendorError> {
        debug!("expecting a {} byte image", self.expected);
        self.image = Some(Vec::with_capacity(self.expected));
        Ok(())
    }

    fn process(&mut self, chunk: &[u8]) -> Result<Processed, VendorError> {
        let image = self.image.as_mut().ok_or(ERR_NOT_INITIALIZED)?;
        let consumed = chunk.len().min(self.expected - image.len());
        image.extend_from_slice(&chunk[..consumed]);

        if image.len() < self.expected {
            return Ok(Processed {
                consumed,
                progress: Progress::Continue,
            });
        }

        let image = self.image.take().unwrap_or_default();
        self.commit(image)?;
        Ok(Processed {
            consumed,
            progress: Progress::Done,
        })
    }
}
