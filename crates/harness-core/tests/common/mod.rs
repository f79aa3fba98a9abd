//! Test cores and devices shared by the integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use harness_core::{CpuCore, CpuFault, Disassembly, MemoryBus, PortBus, SystemBus};

pub const NOP: u8 = 0x00;
pub const INC_A: u8 = 0x3C;
pub const LD_A_N: u8 = 0x3E;
pub const LD_NN_A: u8 = 0x32;
pub const LD_A_NN: u8 = 0x3A;
pub const JP_NN: u8 = 0xC3;
pub const OUT_N_A: u8 = 0xD3;
pub const IN_A_N: u8 = 0xDB;

/// Minimal accumulator machine with a handful of Z80-flavoured opcodes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToyCore {
    pub pc: u16,
    pub a: u8,
    pub halted: bool,
}

impl ToyCore {
    fn operand(bus: &dyn MemoryBus, pc: u16) -> u8 {
        bus.read(pc.wrapping_add(1))
    }

    fn address(bus: &dyn MemoryBus, pc: u16) -> u16 {
        u16::from_le_bytes([bus.read(pc.wrapping_add(1)), bus.read(pc.wrapping_add(2))])
    }
}

impl CpuCore for ToyCore {
    fn execute(&mut self, bus: &mut SystemBus<'_>) -> Result<(), CpuFault> {
        let pc = self.pc;
        let opcode = bus.read(pc);
        match opcode {
            NOP => self.pc = pc.wrapping_add(1),
            INC_A => {
                self.a = self.a.wrapping_add(1);
                self.pc = pc.wrapping_add(1);
            }
            LD_A_N => {
                self.a = Self::operand(bus, pc);
                self.pc = pc.wrapping_add(2);
            }
            LD_NN_A => {
                let addr = Self::address(bus, pc);
                bus.write(addr, self.a);
                self.pc = pc.wrapping_add(3);
            }
            LD_A_NN => {
                let addr = Self::address(bus, pc);
                self.a = bus.read(addr);
                self.pc = pc.wrapping_add(3);
            }
            JP_NN => self.pc = Self::address(bus, pc),
            OUT_N_A => {
                let port = u16::from(Self::operand(bus, pc));
                bus.port_write(port, u16::from(self.a));
                self.pc = pc.wrapping_add(2);
            }
            IN_A_N => {
                let port = u16::from(Self::operand(bus, pc));
                self.a = bus.port_read(port).to_le_bytes()[0];
                self.pc = pc.wrapping_add(2);
            }
            _ => return Err(CpuFault::UnimplementedOpcode { opcode, pc }),
        }
        Ok(())
    }

    fn disassemble(&self, memory: &dyn MemoryBus) -> Disassembly {
        let pc = self.pc;
        let text = match memory.read(pc) {
            NOP => "nop".to_string(),
            INC_A => "inc a".to_string(),
            LD_A_N => format!("ld a,{:#04x}", Self::operand(memory, pc)),
            LD_NN_A => format!("ld ({:#06x}),a", Self::address(memory, pc)),
            LD_A_NN => format!("ld a,({:#06x})", Self::address(memory, pc)),
            JP_NN => format!("jp {:#06x}", Self::address(memory, pc)),
            OUT_N_A => format!("out ({:#04x}),a", Self::operand(memory, pc)),
            IN_A_N => format!("in a,({:#04x})", Self::operand(memory, pc)),
            other => format!("db {other:#04x}"),
        };
        Disassembly::new(text)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn halted(&self) -> bool {
        self.halted
    }

    fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    fn dump(&self) -> String {
        format!("pc={:04x} a={:02x} halted={}", self.pc, self.a, self.halted)
    }
}

/// Core whose every step fails; its disassembly never matches the halt marker.
#[derive(Debug, Default)]
pub struct FaultingCore {
    pub halted: bool,
    pub resets: u32,
}

impl CpuCore for FaultingCore {
    fn execute(&mut self, _bus: &mut SystemBus<'_>) -> Result<(), CpuFault> {
        Err(CpuFault::Core("execution unit on fire".to_string()))
    }

    fn disassemble(&self, _memory: &dyn MemoryBus) -> Disassembly {
        Disassembly::new("ld a,a")
    }

    fn reset(&mut self) {
        self.halted = false;
        self.resets += 1;
    }

    fn halted(&self) -> bool {
        self.halted
    }

    fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    fn dump(&self) -> String {
        String::from("faulting core")
    }
}

/// Core whose `execute` panics, standing in for a buggy core implementation.
#[derive(Debug, Default)]
pub struct PanickingCore {
    pub halted: bool,
}

impl CpuCore for PanickingCore {
    fn execute(&mut self, _bus: &mut SystemBus<'_>) -> Result<(), CpuFault> {
        panic!("core bug");
    }

    fn disassemble(&self, _memory: &dyn MemoryBus) -> Disassembly {
        Disassembly::new("ld a,a")
    }

    fn reset(&mut self) {
        self.halted = false;
    }

    fn halted(&self) -> bool {
        self.halted
    }

    fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    fn dump(&self) -> String {
        String::from("panicking core")
    }
}

/// Port device answering a fixed value on one port and logging every write.
#[derive(Debug, Clone, Default)]
pub struct LatchPorts {
    pub answer_port: u16,
    pub answer: u16,
    pub writes: Arc<Mutex<Vec<(u16, u16)>>>,
}

impl PortBus for LatchPorts {
    fn port_read(&mut self, port: u16) -> u16 {
        if port == self.answer_port {
            self.answer
        } else {
            0
        }
    }

    fn port_write(&mut self, port: u16, value: u16) {
        self.writes
            .lock()
            .expect("port log lock")
            .push((port, value));
    }
}

/// Infinite loop at the reset vector: `jp 0x0000`.
pub const SPIN_FOREVER: [u8; 3] = [JP_NN, 0x00, 0x00];
