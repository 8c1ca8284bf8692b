//! Error types for the FT4222 driver
//!
//! Every native call returns an integer status word. [`check`] classifies it
//! into one of two tiers: [`DriverStatus`] for the underlying D2XX bridge
//! driver (codes 1-18) and [`ChipStatus`] for the LibFT4222 chip driver
//! (codes 1000 and up). The tiers stay distinct in [`Error`] because the
//! recovery policy differs: bridge errors can be transient resource or
//! timing problems, chip errors are almost always configuration mistakes.

use thiserror::Error;

/// Result type for FT4222 operations
pub type Result<T> = core::result::Result<T, Error>;

/// Status codes reported by the D2XX bridge driver.
///
/// `FT_OK` (0) is not represented; success never reaches the error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DriverStatus {
    InvalidHandle = 1,
    DeviceNotFound = 2,
    DeviceNotOpened = 3,
    IoError = 4,
    InsufficientResources = 5,
    InvalidParameter = 6,
    InvalidBaudRate = 7,
    DeviceNotOpenedForErase = 8,
    DeviceNotOpenedForWrite = 9,
    FailedToWriteDevice = 10,
    EepromReadFailed = 11,
    EepromWriteFailed = 12,
    EepromEraseFailed = 13,
    EepromNotPresent = 14,
    EepromNotProgrammed = 15,
    InvalidArgs = 16,
    NotSupported = 17,
    OtherError = 18,
}

impl DriverStatus {
    /// Classify a raw status code, if it falls in the bridge-driver range.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => Self::InvalidHandle,
            2 => Self::DeviceNotFound,
            3 => Self::DeviceNotOpened,
            4 => Self::IoError,
            5 => Self::InsufficientResources,
            6 => Self::InvalidParameter,
            7 => Self::InvalidBaudRate,
            8 => Self::DeviceNotOpenedForErase,
            9 => Self::DeviceNotOpenedForWrite,
            10 => Self::FailedToWriteDevice,
            11 => Self::EepromReadFailed,
            12 => Self::EepromWriteFailed,
            13 => Self::EepromEraseFailed,
            14 => Self::EepromNotPresent,
            15 => Self::EepromNotProgrammed,
            16 => Self::InvalidArgs,
            17 => Self::NotSupported,
            18 => Self::OtherError,
            _ => return None,
        })
    }

    /// Symbolic name from the D2XX headers.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidHandle => "FT_INVALID_HANDLE",
            Self::DeviceNotFound => "FT_DEVICE_NOT_FOUND",
            Self::DeviceNotOpened => "FT_DEVICE_NOT_OPENED",
            Self::IoError => "FT_IO_ERROR",
            Self::InsufficientResources => "FT_INSUFFICIENT_RESOURCES",
            Self::InvalidParameter => "FT_INVALID_PARAMETER",
            Self::InvalidBaudRate => "FT_INVALID_BAUD_RATE",
            Self::DeviceNotOpenedForErase => "FT_DEVICE_NOT_OPENED_FOR_ERASE",
            Self::DeviceNotOpenedForWrite => "FT_DEVICE_NOT_OPENED_FOR_WRITE",
            Self::FailedToWriteDevice => "FT_FAILED_TO_WRITE_DEVICE",
            Self::EepromReadFailed => "FT_EEPROM_READ_FAILED",
            Self::EepromWriteFailed => "FT_EEPROM_WRITE_FAILED",
            Self::EepromEraseFailed => "FT_EEPROM_ERASE_FAILED",
            Self::EepromNotPresent => "FT_EEPROM_NOT_PRESENT",
            Self::EepromNotProgrammed => "FT_EEPROM_NOT_PROGRAMMED",
            Self::InvalidArgs => "FT_INVALID_ARGS",
            Self::NotSupported => "FT_NOT_SUPPORTED",
            Self::OtherError => "FT_OTHER_ERROR",
        }
    }
}

/// Status codes reported by the LibFT4222 chip driver, offset by 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ChipStatus {
    DeviceNotSupported = 1000,
    ClockNotSupported = 1001,
    VendorCmdNotSupported = 1002,
    IsNotSpiMode = 1003,
    IsNotI2cMode = 1004,
    IsNotSpiSingleMode = 1005,
    IsNotSpiMultiMode = 1006,
    WrongI2cAddress = 1007,
    InvalidFunction = 1008,
    InvalidPointer = 1009,
    ExceededMaxTransferSize = 1010,
    FailedToReadDevice = 1011,
    I2cNotSupportedInThisMode = 1012,
    GpioNotSupportedInThisMode = 1013,
    GpioExceededMaxPortNum = 1014,
    GpioWriteNotSupported = 1015,
    GpioPullupInvalidInInputMode = 1016,
    GpioPulldownInvalidInInputMode = 1017,
    GpioOpenDrainInvalidInOutputMode = 1018,
    InterruptNotSupported = 1019,
    GpioInputNotSupported = 1020,
    EventNotSupported = 1021,
    FunctionNotSupported = 1022,
}

impl ChipStatus {
    /// Classify a raw status code, if it falls in the chip range.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1000 => Self::DeviceNotSupported,
            1001 => Self::ClockNotSupported,
            1002 => Self::VendorCmdNotSupported,
            1003 => Self::IsNotSpiMode,
            1004 => Self::IsNotI2cMode,
            1005 => Self::IsNotSpiSingleMode,
            1006 => Self::IsNotSpiMultiMode,
            1007 => Self::WrongI2cAddress,
            1008 => Self::InvalidFunction,
            1009 => Self::InvalidPointer,
            1010 => Self::ExceededMaxTransferSize,
            1011 => Self::FailedToReadDevice,
            1012 => Self::I2cNotSupportedInThisMode,
            1013 => Self::GpioNotSupportedInThisMode,
            1014 => Self::GpioExceededMaxPortNum,
            1015 => Self::GpioWriteNotSupported,
            1016 => Self::GpioPullupInvalidInInputMode,
            1017 => Self::GpioPulldownInvalidInInputMode,
            1018 => Self::GpioOpenDrainInvalidInOutputMode,
            1019 => Self::InterruptNotSupported,
            1020 => Self::GpioInputNotSupported,
            1021 => Self::EventNotSupported,
            1022 => Self::FunctionNotSupported,
            _ => return None,
        })
    }

    /// Symbolic name from the LibFT4222 headers.
    pub fn name(self) -> &'static str {
        match self {
            Self::DeviceNotSupported => "FT4222_DEVICE_NOT_SUPPORTED",
            Self::ClockNotSupported => "FT4222_CLK_NOT_SUPPORTED",
            Self::VendorCmdNotSupported => "FT4222_VENDER_CMD_NOT_SUPPORTED",
            Self::IsNotSpiMode => "FT4222_IS_NOT_SPI_MODE",
            Self::IsNotI2cMode => "FT4222_IS_NOT_I2C_MODE",
            Self::IsNotSpiSingleMode => "FT4222_IS_NOT_SPI_SINGLE_MODE",
            Self::IsNotSpiMultiMode => "FT4222_IS_NOT_SPI_MULTI_MODE",
            Self::WrongI2cAddress => "FT4222_WRONG_I2C_ADDR",
            Self::InvalidFunction => "FT4222_INVAILD_FUNCTION",
            Self::InvalidPointer => "FT4222_INVALID_POINTER",
            Self::ExceededMaxTransferSize => "FT4222_EXCEEDED_MAX_TRANSFER_SIZE",
            Self::FailedToReadDevice => "FT4222_FAILED_TO_READ_DEVICE",
            Self::I2cNotSupportedInThisMode => "FT4222_I2C_NOT_SUPPORTED_IN_THIS_MODE",
            Self::GpioNotSupportedInThisMode => "FT4222_GPIO_NOT_SUPPORTED_IN_THIS_MODE",
            Self::GpioExceededMaxPortNum => "FT4222_GPIO_EXCEEDED_MAX_PORTNUM",
            Self::GpioWriteNotSupported => "FT4222_GPIO_WRITE_NOT_SUPPORTED",
            Self::GpioPullupInvalidInInputMode => "FT4222_GPIO_PULLUP_INVALID_IN_INPUTMODE",
            Self::GpioPulldownInvalidInInputMode => "FT4222_GPIO_PULLDOWN_INVALID_IN_INPUTMODE",
            Self::GpioOpenDrainInvalidInOutputMode => "FT4222_GPIO_OPENDRAIN_INVALID_IN_OUTPUTMODE",
            Self::InterruptNotSupported => "FT4222_INTERRUPT_NOT_SUPPORTED",
            Self::GpioInputNotSupported => "FT4222_GPIO_INPUT_NOT_SUPPORTED",
            Self::EventNotSupported => "FT4222_EVENT_NOT_SUPPORTED",
            Self::FunctionNotSupported => "FT4222_FUN_NOT_SUPPORT",
        }
    }
}

/// Errors that can occur when driving the FT4222
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Bridge driver (D2XX) failure
    #[error("bridge driver error: {}", .0.name())]
    Driver(DriverStatus),
    /// Chip driver (LibFT4222) failure
    #[error("chip error: {}", .0.name())]
    Chip(ChipStatus),
    /// Status code outside both tables
    #[error("unknown status code {0}")]
    UnknownStatus(i32),
    /// Invalid parameter, rejected before any native call
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Malformed value returned by the native layer
    #[error("invalid response from driver: {0}")]
    InvalidResponse(String),
    /// Vendor library could not be loaded or resolved
    #[error("vendor library unavailable: {0}")]
    Library(String),
}

/// Classify a native status word.
///
/// Applied after every native invocation; a no-op on `FT_OK`.
pub fn check(status: i32) -> Result<()> {
    if status == 0 {
        return Ok(());
    }
    if let Some(s) = DriverStatus::from_code(status) {
        return Err(Error::Driver(s));
    }
    if let Some(s) = ChipStatus::from_code(status) {
        return Err(Error::Chip(s));
    }
    Err(Error::UnknownStatus(status))
}
