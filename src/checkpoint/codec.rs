//! Binary checkpoint layout.
//!
//! ```text
//! offset 0   8 bytes   magic  b"EPSBOXCK"
//! offset 8   u32 LE    format version
//! offset 12  u64 LE    payload length N
//! offset 20  N bytes   bincode (standard config) encoding of CheckpointState
//! ```
//!
//! Doubles are stored as their IEEE-754 bits, so a decoded snapshot is
//! bit-identical to the one encoded.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use super::CheckpointState;
use crate::error::{EpsBoxError, Result};

pub const CHECKPOINT_MAGIC: &[u8; 8] = b"EPSBOXCK";
pub const CHECKPOINT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 20;

impl CheckpointState {
    /// Encodes the snapshot with its header.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| EpsBoxError::Other(format!("Failed to encode checkpoint: {}", e)))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(CHECKPOINT_MAGIC);
        bytes.extend_from_slice(&CHECKPOINT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decodes a snapshot produced by [`to_bytes`](CheckpointState::to_bytes).
    ///
    /// # Errors
    ///
    /// - [`EpsBoxError::NotACheckpoint`] for empty input or a foreign magic tag.
    /// - [`EpsBoxError::CorruptCheckpoint`] for a truncated header or payload,
    ///   an undecodable payload or bytes after the payload.
    /// - [`EpsBoxError::IncompatibleCheckpoint`] for an unknown format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(EpsBoxError::NotACheckpoint("input is empty".to_string()));
        }

        let magic_len = bytes.len().min(CHECKPOINT_MAGIC.len());
        if bytes[..magic_len] != CHECKPOINT_MAGIC[..magic_len] {
            return Err(EpsBoxError::NotACheckpoint(
                "missing checkpoint magic tag".to_string(),
            ));
        }
        if bytes.len() < HEADER_LEN {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "header truncated to {} bytes",
                bytes.len()
            )));
        }

        let version = u32::from_le_bytes(read_array(&bytes[8..12])?);
        if version != CHECKPOINT_VERSION {
            return Err(EpsBoxError::IncompatibleCheckpoint(format!(
                "format version {} is not supported (expected {})",
                version, CHECKPOINT_VERSION
            )));
        }

        let declared = u64::from_le_bytes(read_array(&bytes[12..20])?);
        let payload = &bytes[HEADER_LEN..];
        if (payload.len() as u64) < declared {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "payload truncated: {} of {} bytes",
                payload.len(),
                declared
            )));
        }
        if (payload.len() as u64) > declared {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "{} trailing bytes after the payload",
                payload.len() as u64 - declared
            )));
        }

        let (state, consumed): (CheckpointState, usize) =
            bincode::serde::decode_from_slice(payload, bincode::config::standard())
                .map_err(|e| EpsBoxError::CorruptCheckpoint(format!("undecodable payload: {}", e)))?;

        if consumed != payload.len() {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "payload decoded from {} of {} bytes",
                consumed,
                payload.len()
            )));
        }

        Ok(state)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Writes the checkpoint next to `path` and renames it into place, so a
    /// crash never leaves a half-written file under `path`.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let staging = path.with_extension("partial");

        fs::write(&staging, &bytes)?;
        fs::rename(&staging, path)?;

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            generation = self.counters.generation,
            "Wrote checkpoint"
        );
        Ok(())
    }

    /// Reads a checkpoint file. I/O failures are reported as
    /// [`EpsBoxError::Io`], unusable contents as one of the checkpoint
    /// rejection variants.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        Self::from_bytes(&bytes).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "Rejected checkpoint");
        })
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| EpsBoxError::CorruptCheckpoint("malformed header field".to_string()))
}
