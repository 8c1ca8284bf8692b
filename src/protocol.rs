//! FT4222 configuration values and limits
//!
//! Enumerated register values accepted by the chip driver, plus the
//! length limits of the multi-phase SPI transfer. The numeric values match
//! the LibFT4222 headers and are passed through to the native layer
//! unchanged.

/// System clock rate selector
///
/// The SPI clock is derived from this system clock divided by a
/// [`ClockDivisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRate {
    /// 60 MHz system clock
    Sys60MHz = 0,
    /// 24 MHz system clock
    Sys24MHz = 1,
    /// 48 MHz system clock
    Sys48MHz = 2,
    /// 80 MHz system clock
    Sys80MHz = 3,
}

impl ClockRate {
    /// Register value
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Decode a register value read back from the chip
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Sys60MHz),
            1 => Some(Self::Sys24MHz),
            2 => Some(Self::Sys48MHz),
            3 => Some(Self::Sys80MHz),
            _ => None,
        }
    }

    /// Frequency in kHz
    pub fn to_khz(self) -> u32 {
        match self {
            Self::Sys60MHz => 60_000,
            Self::Sys24MHz => 24_000,
            Self::Sys48MHz => 48_000,
            Self::Sys80MHz => 80_000,
        }
    }
}

/// SPI clock divisor (power of 2 of the system clock)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDivisor {
    /// Divide by 2
    Div2 = 1,
    /// Divide by 4
    Div4 = 2,
    /// Divide by 8
    Div8 = 3,
    /// Divide by 16
    Div16 = 4,
    /// Divide by 32
    Div32 = 5,
    /// Divide by 64
    Div64 = 6,
    /// Divide by 128
    Div128 = 7,
    /// Divide by 256
    Div256 = 8,
    /// Divide by 512
    Div512 = 9,
}

impl ClockDivisor {
    /// Get the actual divisor value
    pub fn divisor(self) -> u32 {
        1 << (self as u32)
    }

    /// Get the register value
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// I/O line mode for SPI transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    /// Single I/O (standard SPI: 1-1-1)
    #[default]
    Single = 1,
    /// Dual I/O
    Dual = 2,
    /// Quad I/O
    Quad = 4,
}

impl IoMode {
    /// Get the number of I/O lines
    pub fn lines(self) -> u8 {
        self as u8
    }
}

/// Clock polarity (idle level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockPolarity {
    /// Clock idles low
    #[default]
    IdleLow = 0,
    /// Clock idles high
    IdleHigh = 1,
}

impl ClockPolarity {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Clock phase (capture edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockPhase {
    /// Data captured on the leading edge
    #[default]
    Leading = 0,
    /// Data captured on the trailing edge
    Trailing = 1,
}

impl ClockPhase {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Chip select polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsPolarity {
    /// CS asserted low
    #[default]
    ActiveLow = 0,
    /// CS asserted high
    ActiveHigh = 1,
}

impl CsPolarity {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Wake-up/interrupt trigger condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptTrigger {
    /// Rising edge
    Rising = 0x01,
    /// Falling edge
    Falling = 0x02,
    /// High level
    LevelHigh = 0x04,
    /// Low level
    LevelLow = 0x08,
}

impl InterruptTrigger {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Electrical driving strength for a signal group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivingStrength {
    /// 4 mA
    Ds4Ma = 0,
    /// 8 mA
    Ds8Ma = 1,
    /// 12 mA
    Ds12Ma = 2,
    /// 16 mA
    Ds16Ma = 3,
}

impl DrivingStrength {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Maximum bytes in the command phase of a multi-phase transfer (4-bit field)
pub const MULTI_IO_MAX_COMMAND: usize = 15;

/// Maximum bytes in the data or read phase of a multi-phase transfer (16-bit field)
pub const MULTI_IO_MAX_DATA: usize = 65535;

/// Maximum bytes in a single-phase transfer (16-bit length field)
pub const SINGLE_IO_MAX_DATA: usize = 65535;

/// Complete SPI master configuration
///
/// Set at construction; mutable afterwards only through
/// [`SpiMaster::set_mode`](crate::SpiMaster::set_mode),
/// [`SpiMaster::set_cs`](crate::SpiMaster::set_cs) and
/// [`SpiMaster::set_lines`](crate::SpiMaster::set_lines).
#[derive(Debug, Clone)]
pub struct SpiConfig {
    /// I/O line mode (single/dual/quad)
    pub io_mode: IoMode,
    /// SPI clock divisor of the system clock
    pub clock: ClockDivisor,
    /// Clock polarity
    pub cpol: ClockPolarity,
    /// Clock phase
    pub cpha: ClockPhase,
    /// Chip select output map, one bit per SS line
    pub cs_map: u8,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            io_mode: IoMode::Single,
            clock: ClockDivisor::Div8,
            cpol: ClockPolarity::IdleLow,
            cpha: ClockPhase::Leading,
            cs_map: 0x01,
        }
    }
}

impl SpiConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the I/O line mode
    pub fn with_io_mode(mut self, mode: IoMode) -> Self {
        self.io_mode = mode;
        self
    }

    /// Set the clock divisor
    pub fn with_clock(mut self, clock: ClockDivisor) -> Self {
        self.clock = clock;
        self
    }

    /// Set clock polarity and phase
    pub fn with_mode(mut self, cpol: ClockPolarity, cpha: ClockPhase) -> Self {
        self.cpol = cpol;
        self.cpha = cpha;
        self
    }

    /// Set the chip select output map
    pub fn with_cs_map(mut self, cs_map: u8) -> Self {
        self.cs_map = cs_map;
        self
    }
}
