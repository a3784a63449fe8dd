//! Writing finished documents to disk
//!
//! The destination is opened without truncation, locked exclusively, and
//! only then truncated and rewritten, so a file held open by a viewer or
//! another writer is left untouched and reported as locked.

use crate::{PdfError, Result};
use std::fs::{File, OpenOptions, TryLockError};
use std::io::{self, Write};
use std::path::Path;

/// Windows ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
const WINDOWS_LOCK_ERRORS: [i32; 2] = [32, 33];

/// Write `bytes` to `path`, flushing to stable storage before returning
pub(crate) fn write_locked(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| classify(path, e))?;

    match file.try_lock() {
        Ok(()) => {}
        Err(TryLockError::WouldBlock) => return Err(PdfError::OutputLocked(path.to_path_buf())),
        Err(TryLockError::Error(e)) => return Err(classify(path, e)),
    }

    write_all_synced(&mut file, bytes).map_err(|e| classify(path, e))?;
    file.unlock().map_err(|e| classify(path, e))
}

fn write_all_synced(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Map an IO error to `OutputLocked` when it signals a conflicting holder
fn classify(path: &Path, err: io::Error) -> PdfError {
    if is_lock_conflict(&err) {
        PdfError::OutputLocked(path.to_path_buf())
    } else {
        PdfError::IoError(err)
    }
}

fn is_lock_conflict(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::ResourceBusy {
        return true;
    }
    cfg!(windows)
        && err
            .raw_os_error()
            .is_some_and(|code| WINDOWS_LOCK_ERRORS.contains(&code))
}
