#![no_main]

use harness_core::{
    decode_memory_region, AddressSpace, MemoryBus, MemoryRegion, UNMAPPED_READ_VALUE,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let addr = u16::from_be_bytes([data[0], data[1]]);
    let value = data[2];
    let firmware = &data[3..];

    let Ok(mut space) = AddressSpace::with_firmware(firmware) else {
        return;
    };
    let before = space.read(addr);
    space.write(addr, value);

    match decode_memory_region(addr) {
        MemoryRegion::Program => assert_eq!(space.read(addr), before),
        MemoryRegion::Working => assert_eq!(space.read(addr), value),
        MemoryRegion::Unmapped => assert_eq!(space.read(addr), UNMAPPED_READ_VALUE),
    }
});
