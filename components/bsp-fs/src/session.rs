use crate::{
    backend::{ArchiveDecoder, Progress},
    state::{FsError, Result, VendorOp},
};

/// Largest chunk the archive decoder accepts per call.
pub const ARCHIVE_CHUNK_SIZE: usize = 512;

/// State of the one open firmware pseudo-file.
#[derive(Debug, Default)]
pub(crate) struct OtaSession {
    done: bool,
    consumed: usize,
}

impl OtaSession {
    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }

    /// Feeds `data` to the decoder, returning how much of it was consumed.
    ///
    /// Stops early once the decoder reports the archive complete; every
    /// later call consumes nothing.
    pub(crate) fn feed<A: ArchiveDecoder>(&mut self, archive: &mut A, data: &[u8]) -> Result<usize> {
        let mut written = 0;

        while written < data.len() && !self.done {
            let end = data.len().min(written + ARCHIVE_CHUNK_SIZE);
            let chunk = &data[written..end];
            debug!("{} bytes left to write", data.len() - written);

            let processed = archive.process(chunk).map_err(|_err| {
                error!("archive processing failed with status {}", _err.0);
                VendorOp::ArchiveProcess.failure()
            })?;

            let consumed = processed.consumed.min(chunk.len());
            written += consumed;
            self.consumed += consumed;
            debug!("archive consumed {} bytes", consumed);

            match processed.progress {
                Progress::Done => {
                    info!("archive complete after {} bytes", self.consumed);
                    self.done = true;
                }
                Progress::Continue if consumed == 0 => {
                    error!("archive decoder made no progress");
                    return Err(FsError::WriteErr);
                }
                Progress::Continue => {}
            }
        }

        Ok(written)
    }
}
