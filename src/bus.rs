use embedded_hal::i2c as hal_i2c;
use embedded_hal_async::i2c as async_i2c;

/// Blanket trait for types implementing `embedded_hal_async::i2c::I2c`
pub trait I2cBus: async_i2c::I2c {
    /// Error of the underlying transport
    type BusError: From<<Self as async_i2c::ErrorType>::Error>;
}

impl<T, E> I2cBus for T
where
    T: async_i2c::I2c<Error = E>,
{
    type BusError = E;
}

/// Blanket trait for types implementing the blocking `embedded_hal::i2c::I2c`
pub trait BlockingI2cBus: hal_i2c::I2c {
    /// Error of the underlying transport
    type BusError: From<<Self as hal_i2c::ErrorType>::Error>;
}

impl<T, E> BlockingI2cBus for T
where
    T: hal_i2c::I2c<Error = E>,
{
    type BusError = E;
}

/// Single-register access to an MCP23017.
///
/// A read is `[S][addr+W][reg][P]` followed by `[S][addr+R][byte][P]`, issued as one
/// `write_read` (transports may use a repeated start, which the chip accepts).
/// A write is `[S][addr+W][reg][value][P]`.
pub trait Mcp23017Bus {
    /// Error reported by the transport
    type BusError;

    /// Write `value` to register `reg` of the device at `addr`.
    async fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8)
        -> Result<(), Self::BusError>;

    /// Read one byte from register `reg` of the device at `addr`.
    async fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::BusError>;
}

// Newtype wrappers, since `Mcp23017Bus` can't be implemented for both the async and the
// blocking `I2c` traits at the same time (a mock can implement both)

/// Async I2C transport for the MCP23017
pub struct AsyncI2c<I2C>(I2C);

/// Blocking I2C transport for the MCP23017. The futures it returns complete on first poll.
pub struct BlockingI2c<I2C>(I2C);

impl<I2C> AsyncI2c<I2C> {
    /// Wrap an async I2C bus
    pub fn new(i2c: I2C) -> Self {
        Self(i2c)
    }

    /// Hand back the I2C bus
    pub fn into_inner(self) -> I2C {
        self.0
    }
}

impl<I2C> BlockingI2c<I2C> {
    /// Wrap a blocking I2C bus
    pub fn new(i2c: I2C) -> Self {
        Self(i2c)
    }

    /// Hand back the I2C bus
    pub fn into_inner(self) -> I2C {
        self.0
    }
}

impl<I2C: I2cBus> Mcp23017Bus for AsyncI2c<I2C> {
    type BusError = I2C::BusError;

    async fn write_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u8,
    ) -> Result<(), Self::BusError> {
        self.0.write(addr, &[reg.into(), value]).await?;
        Ok(())
    }

    async fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::BusError> {
        let mut buf = [0x00];
        self.0.write_read(addr, &[reg.into()], &mut buf).await?;
        Ok(buf[0])
    }
}

impl<I2C: BlockingI2cBus> Mcp23017Bus for BlockingI2c<I2C> {
    type BusError = I2C::BusError;

    async fn write_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u8,
    ) -> Result<(), Self::BusError> {
        self.0.write(addr, &[reg.into(), value])?;
        Ok(())
    }

    async fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::BusError> {
        let mut buf = [0x00];
        self.0.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(buf[0])
    }
}
