//! On-disk memoization of frequency vectors.
//!
//! One dump per source path: `<file>_<depth>.dmp` next to a file,
//! `<dir>/dir_<depth>.dmp` inside a directory. The encoding is private
//! to this crate; a magic tag and version byte make the files
//! self-identifying, and any mismatch falls back to a fresh scan so the
//! cache never changes results.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const DUMP_MAGIC: [u8; 4] = *b"PTRD";
const DUMP_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct Dump {
    magic: [u8; 4],
    version: u8,
    depth: u8,
    counts: Vec<u32>,
}

/// `<path>_<depth>.dmp`
pub fn file_dump_name(path: &Path, depth: u8) -> PathBuf {
    PathBuf::from(format!("{}_{}.dmp", path.display(), depth))
}

/// `<path>/dir_<depth>.dmp`
pub fn directory_dump_name(path: &Path, depth: u8) -> PathBuf {
    path.join(format!("dir_{depth}.dmp"))
}

pub fn is_dump(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "dmp")
}

/// Loads a dump if it exists and matches the expected shape. Missing,
/// malformed or mismatched dumps yield `None` and are rescanned by the
/// caller.
pub fn try_read_dump(path: &Path, depth: u8, len: usize) -> Option<Vec<u32>> {
    if !path.is_file() {
        return None;
    }
    match read_dump(path, depth, len) {
        Ok(counts) => Some(counts),
        Err(e) => {
            warn!("ignoring unusable dump {}: {e}", path.display());
            None
        }
    }
}

fn read_dump(path: &Path, depth: u8, len: usize) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let dump: Dump = bincode::deserialize_from(BufReader::new(file))?;
    if dump.magic != DUMP_MAGIC || dump.version != DUMP_VERSION {
        return Err("not a ptrid frequency dump".into());
    }
    if dump.depth != depth || dump.counts.len() != len {
        return Err("dump shape does not match the requested depth".into());
    }
    Ok(dump.counts)
}

/// Best-effort write: failures are logged and ignored.
pub fn write_dump(path: &Path, depth: u8, counts: &[u32]) {
    let dump = Dump {
        magic: DUMP_MAGIC,
        version: DUMP_VERSION,
        depth,
        counts: counts.to_vec(),
    };
    let result = File::create(path)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|f| bincode::serialize_into(BufWriter::new(f), &dump).map_err(Into::into));
    match result {
        Ok(()) => debug!("wrote frequency dump {}", path.display()),
        Err(e) => warn!("could not write dump {}: {e}", path.display()),
    }
}
