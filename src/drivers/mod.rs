pub mod ds3231;
pub mod lis3dh;

pub use ds3231::Ds3231;
pub use lis3dh::Lis3dh;

#[cfg(test)]
pub(crate) mod fake_bus {
    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

    /// Register-file device at one address. Writes set the register pointer from
    /// their first byte; reads and further writes auto-increment it.
    pub(crate) struct RegisterBus {
        pub(crate) address: u8,
        pub(crate) regs: [u8; 256],
        pub(crate) writes: Vec<(u8, u8)>,
        pointer: u8,
    }

    impl RegisterBus {
        pub(crate) fn new(address: u8) -> Self {
            Self {
                address,
                regs: [0; 256],
                writes: Vec::new(),
                pointer: 0,
            }
        }

        pub(crate) fn last_write(&self, reg: u8) -> Option<u8> {
            self.writes
                .iter()
                .rev()
                .find(|(written, _)| *written == reg)
                .map(|(_, value)| *value)
        }
    }

    impl ErrorType for RegisterBus {
        type Error = ErrorKind;
    }

    impl I2c for RegisterBus {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            if address != self.address {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => {
                        let Some((&reg, data)) = bytes.split_first() else {
                            continue;
                        };
                        self.pointer = reg;
                        for &value in data {
                            self.regs[usize::from(self.pointer)] = value;
                            self.writes.push((self.pointer, value));
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                    Operation::Read(buf) => {
                        for slot in buf.iter_mut() {
                            *slot = self.regs[usize::from(self.pointer)];
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
