//! Support for the `MCP23017` "16-Bit I/O Expander with Serial Interface"
//!
//! Datasheet: <https://ww1.microchip.com/downloads/en/devicedoc/20001952c.pdf>
//!
//! The MCP23017 offers two eight-bit GPIO ports.  It has three
//! address pins, so eight devices can coexist on an I2C bus.
//!
//! The driver keeps no copy of the chip's registers: every per-pin change is a
//! read-modify-write of the live register, which preserves the other seven bits.
//! None of these sequences is atomic on the bus. Share one device between tasks
//! through [`Mcp23017`], which serialises whole operations behind a mutex.
//!
//! When passing 16-bit values to this driver, the upper byte corresponds to port
//! B (pins 7..0) and the lower byte corresponds to port A (pins 7..0).
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};

use crate::{
    AsyncI2c, Bank, BankSelector, BlockingI2c, Direction, Drive, Error, InterruptType,
    Mcp23017Bus, Polarity,
};

/// Fixed upper bits of the 7-bit device address
pub const BASE_ADDRESS: u8 = 0x20;
/// Address pin setting used by [`Driver::new_default`]
pub const DEFAULT_ADDRESS: u8 = 0;

const IOCON_BANK: u8 = 1 << 7;
const IOCON_MIRROR: u8 = 1 << 6;
const IOCON_ODR: u8 = 1 << 2;
const IOCON_INTPOL: u8 = 1 << 1;

/// N.B.: These values are for BANK=0, which is the reset state of
/// the chip (and this driver does not change).
///
/// For all registers, the reset value is 0x00, except for
/// IODIR{A,B} which are 0xFF (making all pins inputs) at reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Register {
    /// IODIR: input/output direction: 0=output; 1=input
    IODIRA = 0x00,
    IODIRB = 0x01,
    /// IPOL: input polarity: 0=register values match input pins; 1=opposite
    IPOLA = 0x02,
    IPOLB = 0x03,
    /// GPINTEN: interrupt-on-change: 0=disable; 1=enable
    GPINTENA = 0x04,
    GPINTENB = 0x05,
    /// DEFVAL: default values for interrupt-on-change
    DEFVALA = 0x06,
    DEFVALB = 0x07,
    /// INTCON: interrupt-on-change config: 0=compare to previous pin value;
    ///   1=compare to corresponding bit in DEFVAL
    INTCONA = 0x08,
    INTCONB = 0x09,
    /// IOCON: configuration register, shared by both ports
    /// - Pin 7: BANK (which driver assumes stays 0)
    /// - Pin 6: MIRROR: if enabled, INT{A,B} are logically ORed; an interrupt on either
    ///          port will cause both pins to activate
    /// - Pin 5: SEQOP: controls the incrementing function of the address pointer
    /// - Pin 4: DISSLW: disables slew rate control on SDA
    /// - Pin 3: HAEN: no effect on MCP23017
    /// - Pin 2: ODR: interrupt pins are 0=active-driver outputs (INTPOL sets polarity)
    ///          or 1=open-drain outputs (overrides INTPOL)
    /// - Pin 1: INTPOL: interrupt pin is 0=active-low or 1=active-high
    /// - Pin 0: unused
    IOCONA = 0x0a,
    IOCONB = 0x0b,
    /// GPPU: GPIO pull-ups: enables weak internal pull-ups on each pin (when configured
    ///   as an input)
    GPPUA = 0x0c,
    GPPUB = 0x0d,
    /// INTF: interrupt flags: 0=no interrupt pending; 1=corresponding pin caused interrupt
    INTFA = 0x0e,
    INTFB = 0x0f,
    /// INTCAP: interrupt captured value: reflects value of each pin at the time that they
    ///   caused an interrupt
    INTCAPA = 0x10,
    INTCAPB = 0x11,
    /// GPIO: reflects logic level on pins; writes go to OLAT
    GPIOA = 0x12,
    GPIOB = 0x13,
    /// OLAT: output latches: sets state for pins configured as outputs
    OLATA = 0x14,
    OLATB = 0x15,
}

impl From<Register> for u8 {
    fn from(r: Register) -> u8 {
        r as u8
    }
}

fn pin_mask<E>(pin: u8) -> Result<u8, Error<E>> {
    if pin < 8 {
        Ok(1 << pin)
    } else {
        Err(Error::InvalidPin(pin))
    }
}

/// Driver for the MCP23017
pub struct Driver<B> {
    bus: B,
    addr: u8,
    debug: bool,
}

impl<B> Driver<B> {
    /// Create a driver for the chip whose A2..A0 pins are wired to `address` (0..=7).
    ///
    /// Higher bits are ignored. With `debug` set, every register access is logged.
    /// No bus traffic happens here.
    pub fn new(bus: B, address: u8, debug: bool) -> Self {
        if address > 0x07 {
            log::warn!("mcp23017: address {:#04x} truncated to its low three bits", address);
        }
        Self {
            bus,
            addr: BASE_ADDRESS | (address & 0x07),
            debug,
        }
    }

    /// Driver for address pins tied low, debug logging off
    pub fn new_default(bus: B) -> Self {
        Self::new(bus, DEFAULT_ADDRESS, false)
    }

    /// Effective 7-bit I2C address
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Whether register accesses are logged
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Destroy the driver and return the bus. The chip keeps its register state.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<I2C: crate::I2cBus> Driver<AsyncI2c<I2C>> {
    /// Create a driver on an async I2C bus
    pub fn new_async(i2c: I2C, address: u8, debug: bool) -> Self {
        Self::new(AsyncI2c::new(i2c), address, debug)
    }
}

impl<I2C: crate::BlockingI2cBus> Driver<BlockingI2c<I2C>> {
    /// Create a driver on a blocking I2C bus
    pub fn new_blocking(i2c: I2C, address: u8, debug: bool) -> Self {
        Self::new(BlockingI2c::new(i2c), address, debug)
    }
}

impl<B: Mcp23017Bus> Driver<B> {
    /// Check that the chip answers on the bus.
    ///
    /// The I2C peripheral is set up by whoever owns it before it is handed to the
    /// driver, so nothing needs starting here. This issues one extra register read
    /// (IOCONA) and fails if the chip does not answer. It is optional: every other
    /// operation works without it. Calling it again is harmless.
    pub async fn init(&mut self) -> Result<(), Error<B::BusError>> {
        let iocon = self.read_register(Register::IOCONA).await?;
        if iocon & IOCON_BANK != 0 {
            log::warn!(
                "mcp23017 {:#04x}: IOCON.BANK is set, register addresses will not match",
                self.addr
            );
        }
        Ok(())
    }

    /// Set the direction of one pin.
    pub async fn set_pin_mode(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
        mode: Direction,
    ) -> Result<(), Error<B::BusError>> {
        let reg = bank.resolve().select(Register::IODIRA, Register::IODIRB);
        self.set_bit(reg, pin, mode == Direction::Input).await
    }

    /// Enable or disable the weak pull-up of one pin.
    pub async fn set_pull_up(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
        enable: bool,
    ) -> Result<(), Error<B::BusError>> {
        let reg = bank.resolve().select(Register::GPPUA, Register::GPPUB);
        self.set_bit(reg, pin, enable).await
    }

    /// Set input polarity inversion of one pin. `ActiveLow` inverts the value read back.
    pub async fn set_polarity(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
        polarity: Polarity,
    ) -> Result<(), Error<B::BusError>> {
        let reg = bank.resolve().select(Register::IPOLA, Register::IPOLB);
        self.set_bit(reg, pin, polarity == Polarity::ActiveLow).await
    }

    /// Read the level of one pin; `true` is high.
    pub async fn read_pin(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
    ) -> Result<bool, Error<B::BusError>> {
        let mask = pin_mask::<B::BusError>(pin)?;
        Ok(self.read_bank(bank).await? & mask != 0)
    }

    /// Read the eight pin levels of one bank.
    pub async fn read_bank(&mut self, bank: impl BankSelector) -> Result<u8, Error<B::BusError>> {
        let reg = bank.resolve().select(Register::GPIOA, Register::GPIOB);
        self.read_register(reg).await
    }

    /// Read all sixteen pin levels, port A first.
    pub async fn read_all(&mut self) -> Result<u16, Error<B::BusError>> {
        let a = self.read_register(Register::GPIOA).await?;
        let b = self.read_register(Register::GPIOB).await?;
        Ok(((b as u16) << 8) | a as u16)
    }

    /// Drive one output pin, leaving the rest of the bank untouched.
    ///
    /// Unlike every other operation, a `char` bank is matched case-sensitively
    /// here (see [`BankSelector::resolve_exact`]): `'a'` is bank A, while `'A'`
    /// falls through to bank B.
    pub async fn write_pin(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
        value: bool,
    ) -> Result<(), Error<B::BusError>> {
        let reg = bank.resolve_exact().select(Register::GPIOA, Register::GPIOB);
        self.set_bit(reg, pin, value).await
    }

    /// Overwrite all eight outputs of one bank.
    pub async fn write_bank(
        &mut self,
        bank: impl BankSelector,
        value: u8,
    ) -> Result<(), Error<B::BusError>> {
        let reg = bank.resolve().select(Register::GPIOA, Register::GPIOB);
        self.write_register(reg, value).await
    }

    /// Write all sixteen outputs as two register writes, port A first.
    ///
    /// If the second write fails, port A already holds its new value.
    pub async fn write_all(&mut self, value: u16) -> Result<(), Error<B::BusError>> {
        self.write_register(Register::GPIOA, (value & 0xFF) as u8).await?;
        self.write_register(Register::GPIOB, (value >> 8) as u8).await
    }

    /// Read back the output latches of one bank.
    pub async fn read_output_latch(
        &mut self,
        bank: impl BankSelector,
    ) -> Result<u8, Error<B::BusError>> {
        let reg = bank.resolve().select(Register::OLATA, Register::OLATB);
        self.read_register(reg).await
    }

    /// Drive one output latch, leaving the other latches of the bank untouched.
    ///
    /// Unlike [`write_pin`](Self::write_pin), the byte is rebuilt from OLAT, so the
    /// live levels of input pins never end up in their latches.
    pub(crate) async fn write_latch(
        &mut self,
        bank: Bank,
        pin: u8,
        value: bool,
    ) -> Result<(), Error<B::BusError>> {
        self.set_bit(bank.select(Register::OLATA, Register::OLATB), pin, value)
            .await
    }

    /// Configure the interrupt outputs, identically in IOCONA and IOCONB.
    ///
    /// Sets MIRROR (bit 6), ODR (bit 2) and INTPOL (bit 1); other bits are kept.
    pub async fn configure(
        &mut self,
        mirror: bool,
        drive: Drive,
        polarity: Polarity,
    ) -> Result<(), Error<B::BusError>> {
        let mut mask_set = 0;
        let mut mask_clear = 0;
        for (bit, on) in [
            (IOCON_MIRROR, mirror),
            (IOCON_ODR, drive == Drive::OpenDrain),
            (IOCON_INTPOL, polarity == Polarity::ActiveHigh),
        ] {
            if on {
                mask_set |= bit;
            } else {
                mask_clear |= bit;
            }
        }
        self.update_register(Register::IOCONA, mask_set, mask_clear).await?;
        self.update_register(Register::IOCONB, mask_set, mask_clear).await
    }

    /// Enable interrupt-on-change for one pin.
    pub async fn enable_interrupt(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
        interrupt: InterruptType,
    ) -> Result<(), Error<B::BusError>> {
        let bank = bank.resolve();
        pin_mask::<B::BusError>(pin)?;
        let intcon = bank.select(Register::INTCONA, Register::INTCONB);
        let defval = bank.select(Register::DEFVALA, Register::DEFVALB);
        match interrupt {
            InterruptType::Falling | InterruptType::Rising | InterruptType::Both => {
                self.set_bit(intcon, pin, false).await?;
            }
            InterruptType::High => {
                self.set_bit(intcon, pin, true).await?;
                self.set_bit(defval, pin, false).await?;
            }
            InterruptType::Low => {
                self.set_bit(intcon, pin, true).await?;
                self.set_bit(defval, pin, true).await?;
            }
        }
        self.set_bit(bank.select(Register::GPINTENA, Register::GPINTENB), pin, true)
            .await
    }

    /// Disable interrupt-on-change for one pin.
    pub async fn disable_interrupt(
        &mut self,
        bank: impl BankSelector,
        pin: u8,
    ) -> Result<(), Error<B::BusError>> {
        let reg = bank.resolve().select(Register::GPINTENA, Register::GPINTENB);
        self.set_bit(reg, pin, false).await
    }

    /// Pins of one bank with a pending interrupt.
    pub async fn read_interrupt_flags(
        &mut self,
        bank: impl BankSelector,
    ) -> Result<u8, Error<B::BusError>> {
        let reg = bank.resolve().select(Register::INTFA, Register::INTFB);
        self.read_register(reg).await
    }

    /// Pin levels captured when the interrupt fired. Reading clears the interrupt.
    pub async fn read_interrupt_capture(
        &mut self,
        bank: impl BankSelector,
    ) -> Result<u8, Error<B::BusError>> {
        let reg = bank.resolve().select(Register::INTCAPA, Register::INTCAPB);
        self.read_register(reg).await
    }

    async fn read_register(&mut self, reg: Register) -> Result<u8, Error<B::BusError>> {
        let value = self.bus.read_reg(self.addr, reg).await?;
        if self.debug {
            log::debug!("mcp23017 {:#04x}: {:?} -> {:#04x}", self.addr, reg, value);
        }
        Ok(value)
    }

    async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<B::BusError>> {
        if self.debug {
            log::debug!("mcp23017 {:#04x}: {:?} <- {:#04x}", self.addr, reg, value);
        }
        self.bus.write_reg(self.addr, reg, value).await?;
        Ok(())
    }

    async fn update_register(
        &mut self,
        reg: Register,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Error<B::BusError>> {
        let mut value = self.read_register(reg).await?;
        value |= mask_set;
        value &= !mask_clear;
        self.write_register(reg, value).await
    }

    async fn set_bit(&mut self, reg: Register, bit: u8, value: bool) -> Result<(), Error<B::BusError>> {
        let mask = pin_mask::<B::BusError>(bit)?;
        if value {
            self.update_register(reg, mask, 0).await
        } else {
            self.update_register(reg, 0, mask).await
        }
    }
}

/// MCP23017 shared behind a mutex, so pins split from it can be used independently
pub struct Mcp23017<RM: RawMutex, B>(Mutex<RM, Driver<B>>);

impl<RM: RawMutex, I2C: crate::I2cBus> Mcp23017<RM, AsyncI2c<I2C>> {
    /// Create a new instance of the MCP23017 on an async I2C bus
    pub fn new_async(i2c: I2C, address: u8, debug: bool) -> Self {
        Self::with_mutex(Driver::new_async(i2c, address, debug))
    }
}

impl<RM: RawMutex, I2C: crate::BlockingI2cBus> Mcp23017<RM, BlockingI2c<I2C>> {
    /// Create a new instance of the MCP23017 on a blocking I2C bus
    pub fn new_blocking(i2c: I2C, address: u8, debug: bool) -> Self {
        Self::with_mutex(Driver::new_blocking(i2c, address, debug))
    }
}

impl<RM: RawMutex, B: Mcp23017Bus> Mcp23017<RM, B> {
    /// Put an existing driver behind a mutex
    pub fn with_mutex(driver: Driver<B>) -> Self {
        Self(Mutex::new(driver))
    }

    /// Lock the driver for a sequence of operations no other pin can interleave with.
    pub async fn driver(&self) -> MutexGuard<'_, RM, Driver<B>> {
        self.0.lock().await
    }

    /// Take the driver back out of the mutex
    pub fn into_inner(self) -> Driver<B> {
        self.0.into_inner()
    }

    /// Split the MCP23017 into its individual pins, all in the reset (input) mode
    pub fn split(&mut self) -> Parts<'_, RM, B> {
        Parts {
            gpa0: crate::Pin::new(Bank::A, 0, &self.0),
            gpa1: crate::Pin::new(Bank::A, 1, &self.0),
            gpa2: crate::Pin::new(Bank::A, 2, &self.0),
            gpa3: crate::Pin::new(Bank::A, 3, &self.0),
            gpa4: crate::Pin::new(Bank::A, 4, &self.0),
            gpa5: crate::Pin::new(Bank::A, 5, &self.0),
            gpa6: crate::Pin::new(Bank::A, 6, &self.0),
            gpa7: crate::Pin::new(Bank::A, 7, &self.0),
            gpb0: crate::Pin::new(Bank::B, 0, &self.0),
            gpb1: crate::Pin::new(Bank::B, 1, &self.0),
            gpb2: crate::Pin::new(Bank::B, 2, &self.0),
            gpb3: crate::Pin::new(Bank::B, 3, &self.0),
            gpb4: crate::Pin::new(Bank::B, 4, &self.0),
            gpb5: crate::Pin::new(Bank::B, 5, &self.0),
            gpb6: crate::Pin::new(Bank::B, 6, &self.0),
            gpb7: crate::Pin::new(Bank::B, 7, &self.0),
        }
    }
}

/// Pins of the MCP23017
#[allow(missing_docs)]
pub struct Parts<'a, RM: RawMutex, B> {
    pub gpa0: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa1: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa2: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa3: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa4: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa5: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa6: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpa7: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb0: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb1: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb2: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb3: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb4: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb5: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb6: crate::Pin<'a, crate::mode::Input, RM, B>,
    pub gpb7: crate::Pin<'a, crate::mode::Input, RM, B>,
}
