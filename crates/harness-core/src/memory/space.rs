//! Program/working backing stores behind a single bus decoder.

use crate::memory::map::{
    decode_memory_region, MemoryRegion, PROGRAM_CAPACITY, UNMAPPED_READ_VALUE, WORKING_CAPACITY,
};
use crate::HarnessError;

/// Byte-wide memory bus contract consumed by CPU cores.
///
/// Neither operation can fail: addresses without a backing store read as
/// [`UNMAPPED_READ_VALUE`] and swallow writes.
pub trait MemoryBus {
    /// Reads the byte visible at `addr`.
    fn read(&self, addr: u16) -> u8;

    /// Writes `value` at `addr`. Writes outside the working window are discarded.
    fn write(&mut self, addr: u16, value: u8);
}

/// Firmware-backed program region plus zero-initialized working RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    program: Box<[u8]>,
    working: Box<[u8]>,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self {
            program: vec![0; PROGRAM_CAPACITY].into_boxed_slice(),
            working: vec![0; WORKING_CAPACITY].into_boxed_slice(),
        }
    }
}

impl AddressSpace {
    /// Builds an address space whose program region holds `firmware`.
    ///
    /// The image is copied verbatim starting at the reset vector; any
    /// remaining program bytes stay zero.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FirmwareTooLarge`] when `firmware` does not fit
    /// in [`PROGRAM_CAPACITY`] bytes. Oversized images are never truncated.
    pub fn with_firmware(firmware: &[u8]) -> Result<Self, HarnessError> {
        if firmware.len() > PROGRAM_CAPACITY {
            return Err(HarnessError::FirmwareTooLarge {
                len: firmware.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }

        let mut space = Self::default();
        space.program[..firmware.len()].copy_from_slice(firmware);
        Ok(space)
    }

    /// Read-only view of the program region.
    #[must_use]
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    /// Read-only view of the working region, offset 0 being [`WORKING_START`](crate::WORKING_START).
    #[must_use]
    pub fn working(&self) -> &[u8] {
        &self.working
    }

    /// Zero-fills the working region. The program region is untouched.
    pub fn clear_working(&mut self) {
        self.working.fill(0);
    }
}

impl MemoryBus for AddressSpace {
    fn read(&self, addr: u16) -> u8 {
        let region = decode_memory_region(addr);
        match (region, region.offset_of(addr)) {
            (MemoryRegion::Program, Some(offset)) => self.program[offset],
            (MemoryRegion::Working, Some(offset)) => self.working[offset],
            _ => UNMAPPED_READ_VALUE,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some(offset) = MemoryRegion::Working.offset_of(addr) {
            self.working[offset] = value;
        }
    }
}
