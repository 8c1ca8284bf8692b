//! ft4222-spi - host-side driver for the FTDI FT4222H USB to SPI bridge
//!
//! This crate drives the FT4222H through FTDI's vendor libraries: the D2XX
//! bridge driver for USB transport and enumeration, and LibFT4222 for the
//! chip-specific SPI engine. It covers device discovery and selection,
//! versioned capability data, lifecycle-bound handle ownership and the SPI
//! master transfer primitives, including the multi-phase command/data
//! transfer used by register-style protocols.
//!
//! # Layers
//!
//! - **Enumeration**: [`list_devices`] snapshots the bridge driver's device
//!   table into immutable [`DeviceInfo`] records.
//! - **Device**: [`Device`] owns one native handle; open by description,
//!   timeouts, reset, close-exactly-once teardown.
//! - **Chip**: [`Ft4222`] selects and opens the bridge chip, caches the
//!   chip/library version pair and exposes clock, interrupt, suspend,
//!   chip-mode and reset controls.
//! - **SPI master**: [`SpiMaster`] borrows the open chip and performs the
//!   four transfer primitives.
//!
//! Every native call is classified through a two-tier status taxonomy:
//! bridge-driver failures ([`DriverStatus`], possibly transient)
//! stay distinct from chip failures ([`ChipStatus`], almost always a
//! configuration mistake).
//!
//! # Example
//!
//! ```no_run
//! use ft4222_spi::{ClockDivisor, Ft4222, IoMode, SpiConfig, SpiMaster};
//!
//! let chip = Ft4222::open()?;
//! println!("chip {} ({})", chip.chip_revision(), chip.chip_version());
//!
//! let config = SpiConfig::new()
//!     .with_io_mode(IoMode::Quad)
//!     .with_clock(ClockDivisor::Div64)
//!     .with_cs_map(0x01);
//! let mut spi = SpiMaster::new(&chip, config)?;
//!
//! // Write 0x5A to register address 0x123456 0x78
//! spi.multi_read_write(&[0x02, 0x12, 0x34, 0x56, 0x78, 0x5A], 0, 0, 6)?;
//!
//! // Fast-read 4 bytes back
//! let data = spi.multi_read_write(
//!     &[0x0B, 0x12, 0x34, 0x56, 0x78, 0xFF, 0xFF, 0xFF, 0xFF],
//!     4,
//!     0,
//!     9,
//! )?;
//! assert_eq!(data.len(), 4);
//! # Ok::<(), ft4222_spi::Error>(())
//! ```
//!
//! # Concurrency
//!
//! Everything is synchronous and blocking and there is no internal locking.
//! One physical SPI master means transfers against one chip must be
//! serialized by the caller; the borrow-bound [`SpiMaster`] keeps the
//! handle from escaping its owner, and the whole stack can be put behind a
//! mutex if it has to cross threads.
//!
//! # Scope
//!
//! SPI slave mode, GPIO, I2C, interrupts as a subsystem and EEPROM access
//! are not implemented. The vendor libraries are loaded once per process on
//! first use and never unloaded; see [`system_driver`].

mod device;
mod error;
mod native;
mod protocol;
mod spi;

pub use device::{list_devices, Device, DeviceFlags, DeviceInfo, Ft4222};
pub use error::{check, ChipStatus, DriverStatus, Error, Result};
pub use native::{system_driver, Handle, NativeDriver, VendorLibrary};
pub use protocol::{
    ClockDivisor, ClockPhase, ClockPolarity, ClockRate, CsPolarity, DrivingStrength,
    InterruptTrigger, IoMode, SpiConfig, MULTI_IO_MAX_COMMAND, MULTI_IO_MAX_DATA,
    SINGLE_IO_MAX_DATA,
};
pub use spi::SpiMaster;
