//! Fixed address map and decoding helpers.

/// Inclusive start address of the program (firmware) region.
pub const PROGRAM_START: u16 = 0x0000;
/// Inclusive end address of the program (firmware) region.
pub const PROGRAM_END: u16 = 0x1FFE;
/// Inclusive start address of the working (RAM) window.
pub const WORKING_START: u16 = 0x2000;
/// Inclusive end address of the working (RAM) window.
pub const WORKING_END: u16 = 0xFFFE;

/// Byte capacity of the program region.
pub const PROGRAM_CAPACITY: usize = (PROGRAM_END - PROGRAM_START) as usize + 1;
/// Byte capacity of the working region.
pub const WORKING_CAPACITY: usize = (WORKING_END - WORKING_START) as usize + 1;

/// Value returned for reads that hit no backing store.
///
/// Unmapped reads are intentional: the bus never faults the CPU on gaps.
pub const UNMAPPED_READ_VALUE: u8 = 0x00;

/// Region classification for 16-bit bus addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemoryRegion {
    /// Read-only firmware region (`0x0000..=0x1FFE`).
    Program,
    /// Read-write RAM window (`0x2000..=0xFFFE`).
    Working,
    /// The hole at `0x1FFF` and the top address `0xFFFF`.
    Unmapped,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for a backed region, `None` for [`MemoryRegion::Unmapped`].
    #[must_use]
    pub const fn bounds(self) -> Option<(u16, u16)> {
        match self {
            Self::Program => Some((PROGRAM_START, PROGRAM_END)),
            Self::Working => Some((WORKING_START, WORKING_END)),
            Self::Unmapped => None,
        }
    }

    /// Returns `true` when `addr` decodes to this region.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        matches!(
            (self, decode_memory_region(addr)),
            (Self::Program, Self::Program)
                | (Self::Working, Self::Working)
                | (Self::Unmapped, Self::Unmapped)
        )
    }

    /// Translates `addr` into a zero-based offset inside this region's backing store.
    #[must_use]
    pub const fn offset_of(self, addr: u16) -> Option<usize> {
        match self.bounds() {
            Some((start, end)) if addr >= start && addr <= end => Some((addr - start) as usize),
            _ => None,
        }
    }
}

const _: () = assert_fixed_layout();

const fn assert_fixed_layout() {
    assert!(PROGRAM_START == 0x0000, "program region must hold the reset vector");
    assert!(
        PROGRAM_END < WORKING_START,
        "program and working regions must not overlap"
    );
    assert!(
        WORKING_END < u16::MAX,
        "top of the address space must stay unmapped"
    );
    assert!(PROGRAM_CAPACITY == 0x1FFF, "program capacity drifted");
    assert!(WORKING_CAPACITY == 0xDFFF, "working capacity drifted");
}

/// Decodes a 16-bit bus address into the region that backs it.
#[must_use]
pub const fn decode_memory_region(addr: u16) -> MemoryRegion {
    match addr {
        PROGRAM_START..=PROGRAM_END => MemoryRegion::Program,
        WORKING_START..=WORKING_END => MemoryRegion::Working,
        _ => MemoryRegion::Unmapped,
    }
}
