//! Device enumeration, handle ownership and the FT4222 chip
//!
//! [`list_devices`] snapshots the bridge driver's device table. [`Device`]
//! owns exactly one native handle and releases it exactly once. [`Ft4222`]
//! composes a [`Device`] with the chip-level controls: it selects the right
//! descriptor by name, caches the chip/library version pair at open time
//! and exposes clock, interrupt, suspend, chip-mode and reset controls.

use std::sync::Arc;

use bitflags::bitflags;

use crate::error::{check, DriverStatus, Error, Result};
use crate::native::{Handle, NativeDriver};
use crate::protocol::{ClockRate, InterruptTrigger};

bitflags! {
    /// Flag word of a device descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFlags: u32 {
        /// Device is currently open
        const OPENED = 0x1;
        /// Device enumerated at high speed
        const HIGH_SPEED = 0x2;
    }
}

/// Immutable descriptor of one enumerated bridge device
///
/// Produced fresh on every [`list_devices`] call and never mutated.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Flag word; bit 0 tells open from closed
    pub flags: DeviceFlags,
    /// Device type reported by the bridge driver
    pub device_type: u32,
    /// USB vendor/product id word
    pub id: u32,
    /// USB location id
    pub location_id: u32,
    /// Serial number, decoded from the NUL-padded 16 byte native buffer
    pub serial_number: String,
    /// Description, decoded from the NUL-padded 64 byte native buffer
    pub description: String,
    /// Native handle value, zero unless the device is already open
    pub handle: Handle,
}

impl DeviceInfo {
    /// Whether the descriptor reports the device as already open.
    pub fn is_open(&self) -> bool {
        self.flags.contains(DeviceFlags::OPENED)
    }
}

fn decode_padded(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// List all USB devices visible through the bridge driver.
///
/// Point-in-time snapshot; zero devices is an empty list, not an error.
pub fn list_devices(driver: &dyn NativeDriver) -> Result<Vec<DeviceInfo>> {
    let mut count: u32 = 0;
    check(driver.create_device_info_list(&mut count))?;

    let mut devices = Vec::with_capacity(count as usize);
    for index in 0..count {
        let mut flags = 0u32;
        let mut device_type = 0u32;
        let mut id = 0u32;
        let mut location_id = 0u32;
        let mut serial = [0u8; 16];
        let mut description = [0u8; 64];
        let mut handle: Handle = 0;
        check(driver.get_device_info_detail(
            index,
            &mut flags,
            &mut device_type,
            &mut id,
            &mut location_id,
            &mut serial,
            &mut description,
            &mut handle,
        ))?;

        let info = DeviceInfo {
            flags: DeviceFlags::from_bits_retain(flags),
            device_type,
            id,
            location_id,
            serial_number: decode_padded(&serial),
            description: decode_padded(&description),
            handle,
        };
        log::info!(
            "dev {}: flags=0x{:x} type=0x{:x} id=0x{:x} locid=0x{:x} serial={:?} desc={:?} handle=0x{:x}",
            index,
            info.flags.bits(),
            info.device_type,
            info.id,
            info.location_id,
            info.serial_number,
            info.description,
            info.handle,
        );
        devices.push(info);
    }
    Ok(devices)
}

/// Owner of one open native handle.
///
/// Opened from a descriptor, closed exactly once: either by an explicit
/// [`close`](Device::close) or, failing that, best-effort on drop. The raw
/// handle is never exposed outside the crate.
pub struct Device {
    driver: Arc<dyn NativeDriver>,
    handle: Handle,
    closed: bool,
}

impl Device {
    /// Open the device a descriptor refers to.
    ///
    /// A descriptor flagged as already open is adopted as-is, with no
    /// native call; otherwise the device is opened by description match.
    pub fn open(driver: Arc<dyn NativeDriver>, info: &DeviceInfo) -> Result<Self> {
        let handle = if info.is_open() {
            log::debug!("adopting already-open device {:?}", info.description);
            info.handle
        } else {
            let mut padded = [0u8; 64];
            let bytes = info.description.as_bytes();
            if bytes.len() >= padded.len() {
                return Err(Error::InvalidParameter(format!(
                    "description too long: {} bytes",
                    bytes.len()
                )));
            }
            padded[..bytes.len()].copy_from_slice(bytes);

            let mut handle: Handle = 0;
            check(driver.open_by_description(&padded, &mut handle))?;
            log::debug!("opened {:?}, handle 0x{:x}", info.description, handle);
            handle
        };

        Ok(Self {
            driver,
            handle,
            closed: false,
        })
    }

    pub(crate) fn handle(&self) -> Handle {
        self.handle
    }

    pub(crate) fn driver(&self) -> &Arc<dyn NativeDriver> {
        &self.driver
    }

    /// Set the read and write timeouts, in milliseconds.
    pub fn set_timeouts(&self, read_ms: u32, write_ms: u32) -> Result<()> {
        check(self.driver.set_timeouts(self.handle, read_ms, write_ms))
    }

    /// Reset the device at the bridge-driver level.
    pub fn reset(&self) -> Result<()> {
        check(self.driver.reset_device(self.handle))
    }

    /// Close the handle.
    ///
    /// Not idempotent: a second call reaches the native layer again and
    /// surfaces `FT_INVALID_HANDLE`.
    pub fn close(&mut self) -> Result<()> {
        let result = check(self.driver.close(self.handle));
        if result.is_ok() {
            self.closed = true;
        }
        result
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if !self.closed {
            let status = self.driver.close(self.handle);
            if status != 0 {
                log::warn!("closing handle 0x{:x} failed with status {}", self.handle, status);
            }
        }
    }
}

/// Descriptions the chip enumerates under, depending on its mode.
const ACCEPTED_DESCRIPTIONS: [&str; 2] = ["FT4222 A", "FT4222"];

/// Chip revision labels keyed by chip version id.
const CHIP_REVISIONS: [(u32, &str); 4] = [
    (0x4222_0100, "Rev. A"),
    (0x4222_0200, "Rev. B"),
    (0x4222_0300, "Rev. C"),
    (0x4222_0400, "Rev. D"),
];

/// Minimum chip driver library version per chip revision.
///
/// Informational only; initialization does not enforce it. See
/// [`Ft4222::min_dll_version`].
const CHIP_REV_MIN_DLL: [(u32, u32); 4] = [
    (0x4222_0100, 0),
    (0x4222_0200, 0x0102_0000),
    (0x4222_0300, 0x0103_0000),
    (0x4222_0400, 0x0104_0000),
];

/// An open FT4222 bridge chip.
///
/// Holds the underlying [`Device`] and caches the version pair queried at
/// open time. The cache is never refreshed; after a firmware update the
/// chip must be reopened.
pub struct Ft4222 {
    device: Device,
    chip_version: u32,
    dll_version: u32,
}

impl std::fmt::Debug for Ft4222 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ft4222")
            .field("chip_version", &self.chip_version)
            .field("dll_version", &self.dll_version)
            .finish_non_exhaustive()
    }
}

impl Ft4222 {
    /// Find and open the FT4222 through the process-wide vendor library.
    pub fn open() -> Result<Self> {
        Self::open_with_driver(crate::native::system_driver()?)
    }

    /// Find and open the FT4222 through the given native driver.
    ///
    /// Enumerates the bridge, selects the first descriptor named
    /// `"FT4222 A"` or `"FT4222"`, opens it and caches the version pair.
    /// Fails with `FT_DEVICE_NOT_FOUND` when nothing is connected or no
    /// descriptor matches.
    pub fn open_with_driver(driver: Arc<dyn NativeDriver>) -> Result<Self> {
        let devices = list_devices(&*driver)?;
        if devices.is_empty() {
            return Err(Error::Driver(DriverStatus::DeviceNotFound));
        }
        let info = devices
            .iter()
            .find(|d| ACCEPTED_DESCRIPTIONS.contains(&d.description.as_str()))
            .ok_or(Error::Driver(DriverStatus::DeviceNotFound))?;

        let device = Device::open(driver, info)?;

        let mut chip_version = 0u32;
        let mut dll_version = 0u32;
        check(device.driver().get_version(
            device.handle(),
            &mut chip_version,
            &mut dll_version,
        ))?;
        log::debug!(
            "chip version 0x{:08x}, library version 0x{:08x}",
            chip_version,
            dll_version
        );

        Ok(Self {
            device,
            chip_version,
            dll_version,
        })
    }

    pub(crate) fn handle(&self) -> Handle {
        self.device.handle()
    }

    pub(crate) fn driver(&self) -> &Arc<dyn NativeDriver> {
        self.device.driver()
    }

    /// The underlying handle owner, for timeouts and device-level reset.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Chip silicon version id, as cached at open time.
    pub fn chip_version(&self) -> u32 {
        self.chip_version
    }

    /// Chip driver library version id, as cached at open time.
    pub fn dll_version(&self) -> u32 {
        self.dll_version
    }

    /// Friendly silicon revision label.
    ///
    /// Unknown version ids map to `"Rev. Unknown"` rather than failing.
    pub fn chip_revision(&self) -> &'static str {
        CHIP_REVISIONS
            .iter()
            .find(|(id, _)| *id == self.chip_version)
            .map(|(_, label)| *label)
            .unwrap_or("Rev. Unknown")
    }

    /// Minimum chip driver library version required for this silicon
    /// revision, when the revision is known.
    pub fn min_dll_version(&self) -> Option<u32> {
        CHIP_REV_MIN_DLL
            .iter()
            .find(|(id, _)| *id == self.chip_version)
            .map(|(_, min)| *min)
    }

    /// Select the system clock rate.
    pub fn set_clock(&self, clock: ClockRate) -> Result<()> {
        check(self.driver().set_clock(self.handle(), clock.value()))
    }

    /// Read back the system clock rate.
    pub fn get_clock(&self) -> Result<ClockRate> {
        let mut raw = 0u8;
        check(self.driver().get_clock(self.handle(), &mut raw))?;
        ClockRate::from_raw(raw)
            .ok_or_else(|| Error::InvalidResponse(format!("unknown clock rate value {}", raw)))
    }

    /// Enable or disable the wake-up interrupt.
    pub fn set_wakeup_interrupt(&self, enable: bool) -> Result<()> {
        check(self.driver().set_wakeup_interrupt(self.handle(), enable))
    }

    /// Read back the wake-up interrupt enable.
    pub fn get_wakeup_interrupt(&self) -> Result<bool> {
        let mut enable = false;
        check(self.driver().get_wakeup_interrupt(self.handle(), &mut enable))?;
        Ok(enable)
    }

    /// Set the interrupt trigger condition.
    pub fn set_interrupt_trigger(&self, trigger: InterruptTrigger) -> Result<()> {
        check(
            self.driver()
                .set_interrupt_trigger(self.handle(), trigger.value()),
        )
    }

    /// Enable or disable the suspend-out signal.
    pub fn set_suspend_out(&self, enable: bool) -> Result<()> {
        check(self.driver().set_suspend_out(self.handle(), enable))
    }

    /// Largest transfer the chip accepts, in bytes.
    pub fn max_transfer_size(&self) -> Result<u16> {
        let mut size = 0u16;
        check(self.driver().get_max_transfer_size(self.handle(), &mut size))?;
        Ok(size)
    }

    /// Raw chip mode byte, as strapped at power-up.
    pub fn chip_mode(&self) -> Result<u8> {
        let mut mode = 0u8;
        check(self.driver().get_chip_mode(self.handle(), &mut mode))?;
        Ok(mode)
    }

    /// Soft-reset the chip. Distinct from [`Device::reset`].
    pub fn chip_reset(&self) -> Result<()> {
        check(self.driver().chip_reset(self.handle()))
    }
}

impl Drop for Ft4222 {
    fn drop(&mut self) {
        // De-initialize the chip driver state before the inner Device
        // closes the handle; both steps must run.
        let status = self.device.driver().uninitialize(self.device.handle());
        if status != 0 {
            log::warn!(
                "uninitialize of handle 0x{:x} failed with status {}",
                self.device.handle(),
                status
            );
        }
    }
}
