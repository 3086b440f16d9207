//! Streaming file copy.
//!
//! The destination is created with `create_new`, so an in-progress copy never
//! clobbers anything; callers copy into a fresh temporary name and rename it
//! into place afterwards. The copied data is fsynced before returning.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy the contents of `src` into the new file `dst`; returns bytes written.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}
