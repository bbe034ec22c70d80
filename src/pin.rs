use core::marker::PhantomData;

use embassy_futures::block_on;
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};
use embedded_hal::digital::{self as hal_digital, ErrorType};

use crate::{Bank, Direction, Driver, Error, Mcp23017Bus, Polarity};

/// Representation of an expander pin.
///
/// `Pin` is not constructed directly, this type is created by instanciating an
/// [`Mcp23017`](crate::Mcp23017) and then getting access to all its pins using the
/// `.split()` method.
pub struct Pin<'a, MODE, RM: RawMutex, B> {
    bank: Bank,
    index: u8,
    driver: &'a Mutex<RM, Driver<B>>,
    _m: PhantomData<MODE>,
}

impl<'a, MODE, RM: RawMutex, B: Mcp23017Bus> Pin<'a, MODE, RM, B> {
    pub(crate) fn new(bank: Bank, index: u8, driver: &'a Mutex<RM, Driver<B>>) -> Self {
        assert!(index < 8);
        Self {
            bank,
            index,
            driver,
            _m: PhantomData,
        }
    }

    /// Port this pin belongs to
    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// Bit position within the bank
    pub fn index(&self) -> u8 {
        self.index
    }

    async fn driver(&self) -> MutexGuard<'a, RM, Driver<B>> {
        let driver: &'a Mutex<RM, Driver<B>> = self.driver;
        driver.lock().await
    }

    fn into_mode<M>(self) -> Pin<'a, M, RM, B> {
        Pin {
            bank: self.bank,
            index: self.index,
            driver: self.driver,
            _m: PhantomData,
        }
    }

    /// Configure this pin as an input.
    pub async fn into_input(self) -> Result<Pin<'a, crate::mode::Input, RM, B>, Error<B::BusError>> {
        self.driver()
            .await
            .set_pin_mode(self.bank, self.index, Direction::Input)
            .await?;
        Ok(self.into_mode())
    }

    /// Configure this pin as an output, leaving the output latch as it is.
    pub async fn into_output(self) -> Result<Pin<'a, crate::mode::Output, RM, B>, Error<B::BusError>> {
        self.driver()
            .await
            .set_pin_mode(self.bank, self.index, Direction::Output)
            .await?;
        Ok(self.into_mode())
    }

    /// Configure this pin as an output with an initial HIGH state.
    ///
    /// The latch is written before the direction changes, so the pin never drives LOW.
    pub async fn into_output_high(
        self,
    ) -> Result<Pin<'a, crate::mode::Output, RM, B>, Error<B::BusError>> {
        {
            let mut driver = self.driver().await;
            driver.write_latch(self.bank, self.index, true).await?;
            driver
                .set_pin_mode(self.bank, self.index, Direction::Output)
                .await?;
        }
        Ok(self.into_mode())
    }

    /// Set hardware polarity inversion for this pin.
    pub async fn set_polarity(&mut self, polarity: Polarity) -> Result<(), Error<B::BusError>> {
        self.driver()
            .await
            .set_polarity(self.bank, self.index, polarity)
            .await
    }
}

impl<'a, MODE: crate::mode::HasInput, RM: RawMutex, B: Mcp23017Bus> Pin<'a, MODE, RM, B> {
    /// Read the pin's input state and return `true` if it is HIGH.
    pub async fn is_high(&self) -> Result<bool, Error<B::BusError>> {
        self.driver().await.read_pin(self.bank, self.index).await
    }

    /// Read the pin's input state and return `true` if it is LOW.
    pub async fn is_low(&self) -> Result<bool, Error<B::BusError>> {
        Ok(!self.is_high().await?)
    }

    /// Enable/Disable the pull-up resistor for this pin.
    ///
    /// If `enable` is `false`, the pin is configured as floating input.
    pub async fn enable_pull_up(&mut self, enable: bool) -> Result<(), Error<B::BusError>> {
        self.driver()
            .await
            .set_pull_up(self.bank, self.index, enable)
            .await
    }
}

impl<'a, MODE: crate::mode::HasOutput, RM: RawMutex, B: Mcp23017Bus> Pin<'a, MODE, RM, B> {
    /// Set the pin's output state to HIGH.
    pub async fn set_high(&mut self) -> Result<(), Error<B::BusError>> {
        self.driver()
            .await
            .write_latch(self.bank, self.index, true)
            .await
    }

    /// Set the pin's output state to LOW.
    pub async fn set_low(&mut self) -> Result<(), Error<B::BusError>> {
        self.driver()
            .await
            .write_latch(self.bank, self.index, false)
            .await
    }

    /// Return `true` if the pin's output latch is HIGH.
    ///
    /// This method does **not** read the pin's electrical state.
    pub async fn is_set_high(&self) -> Result<bool, Error<B::BusError>> {
        let latch = self.driver().await.read_output_latch(self.bank).await?;
        Ok(latch & (1 << self.index) != 0)
    }

    /// Return `true` if the pin's output latch is LOW.
    ///
    /// This method does **not** read the pin's electrical state.
    pub async fn is_set_low(&self) -> Result<bool, Error<B::BusError>> {
        Ok(!self.is_set_high().await?)
    }

    /// Toggle the pin's output state.
    ///
    /// The latch read and the write happen under one lock.
    pub async fn toggle(&mut self) -> Result<(), Error<B::BusError>> {
        let mut driver = self.driver().await;
        let latch = driver.read_output_latch(self.bank).await?;
        driver
            .write_latch(self.bank, self.index, latch & (1 << self.index) == 0)
            .await
    }
}

impl<'a, MODE, RM, B> ErrorType for Pin<'a, MODE, RM, B>
where
    RM: RawMutex,
    B: Mcp23017Bus,
    B::BusError: core::fmt::Debug,
{
    type Error = Error<B::BusError>;
}

impl<'a, MODE: crate::mode::HasInput, RM, B> hal_digital::InputPin for Pin<'a, MODE, RM, B>
where
    RM: RawMutex,
    B: Mcp23017Bus,
    B::BusError: core::fmt::Debug,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        block_on(Pin::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        block_on(Pin::is_low(self))
    }
}

impl<'a, MODE: crate::mode::HasOutput, RM, B> hal_digital::OutputPin for Pin<'a, MODE, RM, B>
where
    RM: RawMutex,
    B: Mcp23017Bus,
    B::BusError: core::fmt::Debug,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        block_on(Pin::set_low(self))
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        block_on(Pin::set_high(self))
    }
}

impl<'a, MODE: crate::mode::HasOutput, RM, B> hal_digital::StatefulOutputPin
    for Pin<'a, MODE, RM, B>
where
    RM: RawMutex,
    B: Mcp23017Bus,
    B::BusError: core::fmt::Debug,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        block_on(Pin::is_set_high(self))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        block_on(Pin::is_set_low(self))
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        block_on(Pin::toggle(self))
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    use crate::Mcp23017;

    const ADDR: u8 = 0x21;

    fn read(reg: u8, value: u8) -> mock_i2c::Transaction {
        mock_i2c::Transaction::write_read(ADDR, vec![reg], vec![value])
    }

    fn write(reg: u8, value: u8) -> mock_i2c::Transaction {
        mock_i2c::Transaction::write(ADDR, vec![reg, value])
    }

    #[test]
    fn output_pin() {
        let expectations = [
            // into_output on GPB6
            read(0x01, 0xff),
            write(0x01, 0b1011_1111),
            // set_high
            read(0x15, 0x00),
            write(0x15, 0b0100_0000),
            // is_set_high
            read(0x15, 0b0100_0000),
            // toggle
            read(0x15, 0b0100_0000),
            read(0x15, 0b0100_0000),
            write(0x15, 0x00),
            // set_low through embedded-hal
            read(0x15, 0b1000_0000),
            write(0x15, 0b1000_0000),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut mcp = Mcp23017::<NoopRawMutex, _>::new_blocking(bus.clone(), 1, false);
        let mcp_pins = mcp.split();

        let mut led = block_on(mcp_pins.gpb6.into_output()).unwrap();
        block_on(led.set_high()).unwrap();
        assert!(StatefulOutputPin::is_set_high(&mut led).unwrap());
        StatefulOutputPin::toggle(&mut led).unwrap();
        OutputPin::set_low(&mut led).unwrap();

        bus.done();
    }

    #[test]
    fn output_high_latches_before_switching() {
        let expectations = [
            read(0x14, 0x00),
            write(0x14, 0b0000_0100),
            read(0x00, 0xff),
            write(0x00, 0b1111_1011),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut mcp = Mcp23017::<NoopRawMutex, _>::new_blocking(bus.clone(), 1, false);
        let mcp_pins = mcp.split();

        let pin = block_on(mcp_pins.gpa2.into_output_high()).unwrap();
        assert_eq!(pin.index(), 2);

        bus.done();
    }

    #[test]
    fn input_levels_stay_out_of_the_latches() {
        // GPA3 is an input held high by the outside world, its latch is low.
        // Driving GPA2 must only touch OLATA, so GPA3 still drives low once it
        // becomes an output.
        let expectations = [
            // gpa2.into_output_high
            read(0x14, 0b0000_0000),
            write(0x14, 0b0000_0100),
            read(0x00, 0xff),
            write(0x00, 0b1111_1011),
            // gpa3.into_output
            read(0x00, 0b1111_1011),
            write(0x00, 0b1111_0011),
            // gpa3.is_set_high
            read(0x14, 0b0000_0100),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut mcp = Mcp23017::<NoopRawMutex, _>::new_blocking(bus.clone(), 1, false);
        let mcp_pins = mcp.split();

        block_on(mcp_pins.gpa2.into_output_high()).unwrap();
        let mut gpa3 = block_on(mcp_pins.gpa3.into_output()).unwrap();
        assert!(!StatefulOutputPin::is_set_high(&mut gpa3).unwrap());

        bus.done();
    }

    #[test]
    fn input_pin() {
        let expectations = [
            // enable_pull_up on GPA3
            read(0x0c, 0x00),
            write(0x0c, 0b0000_1000),
            read(0x12, 0b0000_1000),
            read(0x12, 0b1111_0111),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut mcp = Mcp23017::<NoopRawMutex, _>::new_blocking(bus.clone(), 1, false);
        let mut mcp_pins = mcp.split();

        block_on(mcp_pins.gpa3.enable_pull_up(true)).unwrap();
        assert!(InputPin::is_high(&mut mcp_pins.gpa3).unwrap());
        assert!(InputPin::is_low(&mut mcp_pins.gpa3).unwrap());

        bus.done();
    }

    #[test]
    fn shared_driver_access() {
        let expectations = [write(0x12, 0xaa), write(0x13, 0x55)];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mcp = Mcp23017::<NoopRawMutex, _>::new_blocking(bus.clone(), 1, false);

        block_on(async {
            mcp.driver().await.write_all(0x55aa).await.unwrap();
        });
        assert_eq!(mcp.into_inner().address(), ADDR);

        bus.done();
    }
}
