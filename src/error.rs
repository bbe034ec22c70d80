use core::fmt;

use embedded_hal::digital;

/// Error returned by every driver and pin operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus transport failed. No value read during the failed operation
    /// was used, and a read-modify-write stops before its write.
    Bus(E),
    /// Pin index outside `0..=7`. Nothing was sent on the bus.
    InvalidPin(u8),
}

impl<E> Error<E> {
    /// The upstream bus error, if that is what occurred
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            Error::Bus(e) => Some(e),
            Error::InvalidPin(_) => None,
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Error::Bus(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus transfer failed: {e:?}"),
            Error::InvalidPin(pin) => write!(f, "pin {pin} out of range 0..=7"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

impl<E: fmt::Debug> digital::Error for Error<E> {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}
