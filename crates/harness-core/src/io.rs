//! Port-addressed IO bus, separate from the memory address space.

/// Value returned by port reads when no device answers.
pub const UNMAPPED_PORT_VALUE: u16 = 0x0000;

/// Port read/write contract consumed by CPU cores for `IN`/`OUT` style instructions.
///
/// Implementations must not fail; a device that cannot service a port
/// answers with [`UNMAPPED_PORT_VALUE`] and ignores writes.
pub trait PortBus: Send {
    /// Reads the device register at `port`.
    fn port_read(&mut self, port: u16) -> u16;

    /// Writes `value` to the device register at `port`.
    fn port_write(&mut self, port: u16, value: u16);
}

/// Default port device: nothing attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NullPortBus;

impl PortBus for NullPortBus {
    fn port_read(&mut self, _port: u16) -> u16 {
        UNMAPPED_PORT_VALUE
    }

    fn port_write(&mut self, _port: u16, _value: u16) {}
}
