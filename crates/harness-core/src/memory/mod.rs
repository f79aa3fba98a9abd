//! Memory bus: fixed region map and the firmware/RAM address space.

/// Fixed region map and address decoder.
pub mod map;
/// Backing stores and the [`MemoryBus`] contract.
pub mod space;

pub use map::{
    decode_memory_region, MemoryRegion, PROGRAM_CAPACITY, PROGRAM_END, PROGRAM_START,
    UNMAPPED_READ_VALUE, WORKING_CAPACITY, WORKING_END, WORKING_START,
};
pub use space::{AddressSpace, MemoryBus};

/// Size in bytes of the flat 16-bit bus address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;
