/// One of the two eight-bit GPIO ports of the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// Port A, pins GPA0..GPA7
    A,
    /// Port B, pins GPB0..GPB7
    B,
}

impl Bank {
    /// Pick the A or B half of a register pair.
    pub(crate) fn select<T>(self, a: T, b: T) -> T {
        match self {
            Bank::A => a,
            Bank::B => b,
        }
    }
}

impl From<char> for Bank {
    fn from(bank: char) -> Self {
        bank.resolve()
    }
}

/// Anything that names a bank: a [`Bank`] or a `char`.
///
/// Characters are not validated. `'a'` and `'A'` select bank A and every other
/// character, `'b'` included, selects bank B.
pub trait BankSelector: Copy {
    /// Resolve to a bank, ignoring the case of the letter `a`.
    fn resolve(self) -> Bank;

    /// Resolve to a bank, matching only a lowercase `'a'` as bank A.
    ///
    /// [`Driver::write_pin`](crate::Driver::write_pin) uses this rule, so
    /// `write_pin('A', ..)` drives bank B. A [`Bank`] resolves to itself
    /// under both rules.
    fn resolve_exact(self) -> Bank;
}

impl BankSelector for Bank {
    fn resolve(self) -> Bank {
        self
    }

    fn resolve_exact(self) -> Bank {
        self
    }
}

impl BankSelector for char {
    fn resolve(self) -> Bank {
        if self.eq_ignore_ascii_case(&'a') {
            Bank::A
        } else {
            Bank::B
        }
    }

    fn resolve_exact(self) -> Bank {
        if self == 'a' {
            Bank::A
        } else {
            Bank::B
        }
    }
}

/// Pin direction, encoded the way the IODIR register stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// IODIR bit cleared
    Output = 0,
    /// IODIR bit set (reset state of every pin)
    Input = 1,
}

/// Logic level that counts as "active".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Active when low. For input pins this turns on IPOL inversion.
    ActiveLow,
    /// Active when high.
    ActiveHigh,
}

/// Output stage of the interrupt pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// Active driver; level set by [`Polarity`]
    PushPull,
    /// Open-drain; overrides [`Polarity`]
    OpenDrain,
}

/// Condition that raises an interrupt-on-change for one pin.
///
/// The chip only knows "changed" and "differs from DEFVAL". `Falling`, `Rising`
/// and `Both` all fire on any change; use the captured value to tell edges apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptType {
    #[allow(missing_docs)]
    Falling = 1,
    #[allow(missing_docs)]
    Rising,
    #[allow(missing_docs)]
    Both,
    /// Fires while the pin reads high
    High,
    /// Fires while the pin reads low
    Low,
}

/// Pin Modes
pub mod mode {
    /// Trait for pin-modes which can be used to set a logic level.
    pub trait HasOutput {}
    /// Trait for pin-modes which can be used to read a logic level.
    pub trait HasInput {}

    /// Pin configured as an input.
    pub struct Input;
    impl HasInput for Input {}

    /// Pin configured as an output.
    pub struct Output;
    impl HasOutput for Output {}
}
