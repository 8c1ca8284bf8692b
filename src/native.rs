//! Native driver seam
//!
//! The crate talks to the hardware through two vendor libraries: the D2XX
//! bridge driver (`FT_*` entry points, USB transport level) and the
//! LibFT4222 chip driver (`FT4222_*` entry points). [`NativeDriver`]
//! abstracts every entry point the crate calls; methods mirror the C
//! signatures (out-parameters, raw `i32` status word) so that
//! [`check`](crate::error::check) applies uniformly and an in-memory stub
//! is trivial to write for tests.
//!
//! [`VendorLibrary`] is the real implementation. It resolves all symbols
//! once at load time and keeps both library handles alive for the life of
//! the process; [`system_driver`] performs that load exactly once.

use std::ffi::c_void;
use std::sync::Arc;

use libloading::Library;
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

/// Opaque native device handle (`FT_HANDLE`, pointer sized).
pub type Handle = usize;

/// `FT_OpenEx` flag: match on the description string.
const FT_OPEN_BY_DESCRIPTION: u32 = 2;

/// Native entry points of the D2XX and LibFT4222 vendor libraries.
///
/// Every method performs one blocking native call and returns the raw
/// status word; classification happens in the caller via
/// [`check`](crate::error::check). Implementations must not retry.
pub trait NativeDriver: Send + Sync {
    // D2XX bridge driver
    fn create_device_info_list(&self, count: &mut u32) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn get_device_info_detail(
        &self,
        index: u32,
        flags: &mut u32,
        device_type: &mut u32,
        id: &mut u32,
        location_id: &mut u32,
        serial: &mut [u8; 16],
        description: &mut [u8; 64],
        handle: &mut Handle,
    ) -> i32;
    fn open_by_description(&self, description: &[u8; 64], handle: &mut Handle) -> i32;
    fn close(&self, handle: Handle) -> i32;
    fn set_timeouts(&self, handle: Handle, read_ms: u32, write_ms: u32) -> i32;
    fn reset_device(&self, handle: Handle) -> i32;

    // LibFT4222 chip driver
    fn get_version(&self, handle: Handle, chip_version: &mut u32, dll_version: &mut u32) -> i32;
    fn set_clock(&self, handle: Handle, clock: u8) -> i32;
    fn get_clock(&self, handle: Handle, clock: &mut u8) -> i32;
    fn set_wakeup_interrupt(&self, handle: Handle, enable: bool) -> i32;
    fn get_wakeup_interrupt(&self, handle: Handle, enable: &mut bool) -> i32;
    fn set_interrupt_trigger(&self, handle: Handle, trigger: u8) -> i32;
    fn set_suspend_out(&self, handle: Handle, enable: bool) -> i32;
    fn get_max_transfer_size(&self, handle: Handle, max_size: &mut u16) -> i32;
    fn get_chip_mode(&self, handle: Handle, mode: &mut u8) -> i32;
    fn chip_reset(&self, handle: Handle) -> i32;
    fn uninitialize(&self, handle: Handle) -> i32;

    // LibFT4222 SPI master
    fn spi_master_init(
        &self,
        handle: Handle,
        io_mode: u8,
        clock: u8,
        cpol: u8,
        cpha: u8,
        cs_map: u8,
    ) -> i32;
    fn spi_master_set_mode(&self, handle: Handle, cpol: u8, cpha: u8) -> i32;
    fn spi_master_set_cs(&self, handle: Handle, cs: u8) -> i32;
    fn spi_master_set_lines(&self, handle: Handle, io_mode: u8) -> i32;
    fn spi_master_single_read(&self, handle: Handle, buffer: &mut [u8], transferred: &mut u16)
        -> i32;
    fn spi_master_single_write(&self, handle: Handle, buffer: &[u8], transferred: &mut u16) -> i32;
    fn spi_master_single_read_write(
        &self,
        handle: Handle,
        read: &mut [u8],
        write: &[u8],
        transferred: &mut u16,
    ) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn spi_master_multi_read_write(
        &self,
        handle: Handle,
        read: &mut [u8],
        write: &[u8],
        command_len: u8,
        data_len: u16,
        read_len: u16,
        transferred: &mut u16,
    ) -> i32;
    fn spi_reset(&self, handle: Handle) -> i32;
    fn spi_reset_transaction(&self, handle: Handle, index: u8) -> i32;
    fn spi_set_driving_strength(&self, handle: Handle, clock: u8, io: u8, cs: u8) -> i32;
}

#[cfg(windows)]
const D2XX_LIBRARY: &str = "ftd2xx.dll";
#[cfg(windows)]
const FT4222_LIBRARY: &str = "LibFT4222-64.dll";
#[cfg(target_os = "macos")]
const D2XX_LIBRARY: &str = "libftd2xx.dylib";
#[cfg(target_os = "macos")]
const FT4222_LIBRARY: &str = "libft4222.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
const D2XX_LIBRARY: &str = "libftd2xx.so";
#[cfg(all(unix, not(target_os = "macos")))]
const FT4222_LIBRARY: &str = "libft4222.so";

/// Version record filled in by `FT4222_GetVersion`.
#[repr(C)]
struct RawVersion {
    chip_version: u32,
    dll_version: u32,
}

// The D2XX headers declare the entry points WINAPI; "system" matches that
// on 32-bit Windows and is plain "C" everywhere else.
type FnCreateDeviceInfoList = unsafe extern "system" fn(*mut u32) -> i32;
type FnGetDeviceInfoDetail = unsafe extern "system" fn(
    u32,
    *mut u32,
    *mut u32,
    *mut u32,
    *mut u32,
    *mut c_void,
    *mut c_void,
    *mut Handle,
) -> i32;
type FnOpenEx = unsafe extern "system" fn(*const c_void, u32, *mut Handle) -> i32;
type FnClose = unsafe extern "system" fn(Handle) -> i32;
type FnSetTimeouts = unsafe extern "system" fn(Handle, u32, u32) -> i32;
type FnResetDevice = unsafe extern "system" fn(Handle) -> i32;

type FnGetVersion = unsafe extern "system" fn(Handle, *mut RawVersion) -> i32;
type FnSetU32 = unsafe extern "system" fn(Handle, i32) -> i32;
type FnGetI32 = unsafe extern "system" fn(Handle, *mut i32) -> i32;
type FnGetU16 = unsafe extern "system" fn(Handle, *mut u16) -> i32;
type FnGetU8 = unsafe extern "system" fn(Handle, *mut u8) -> i32;
type FnHandleOnly = unsafe extern "system" fn(Handle) -> i32;
type FnSpiMasterInit = unsafe extern "system" fn(Handle, i32, i32, i32, i32, u8) -> i32;
type FnSpiMasterSetMode = unsafe extern "system" fn(Handle, i32, i32) -> i32;
type FnSpiSingle = unsafe extern "system" fn(Handle, *mut u8, u16, *mut u16, i32) -> i32;
type FnSpiSingleRw =
    unsafe extern "system" fn(Handle, *mut u8, *mut u8, u16, *mut u16, i32) -> i32;
type FnSpiMultiRw =
    unsafe extern "system" fn(Handle, *mut u8, *const u8, u8, u16, u16, *mut u16) -> i32;
type FnSpiResetTransaction = unsafe extern "system" fn(Handle, u8) -> i32;
type FnSpiSetDrivingStrength = unsafe extern "system" fn(Handle, i32, i32, i32) -> i32;

macro_rules! resolve {
    ($lib:expr, $name:literal) => {
        *unsafe { $lib.get($name) }.map_err(|e| {
            Error::Library(format!(
                "missing symbol {}: {}",
                String::from_utf8_lossy(&$name[..$name.len() - 1]),
                e
            ))
        })?
    };
}

/// The loaded vendor libraries with all entry points resolved.
///
/// The two [`Library`] handles are kept alive for the life of the value so
/// the extracted function pointers stay valid; [`system_driver`] never
/// drops them.
pub struct VendorLibrary {
    create_device_info_list: FnCreateDeviceInfoList,
    get_device_info_detail: FnGetDeviceInfoDetail,
    open_ex: FnOpenEx,
    close: FnClose,
    set_timeouts: FnSetTimeouts,
    reset_device: FnResetDevice,

    get_version: FnGetVersion,
    set_clock: FnSetU32,
    get_clock: FnGetI32,
    set_wakeup_interrupt: FnSetU32,
    get_wakeup_interrupt: FnGetI32,
    set_interrupt_trigger: FnSetU32,
    set_suspend_out: FnSetU32,
    get_max_transfer_size: FnGetU16,
    get_chip_mode: FnGetU8,
    chip_reset: FnHandleOnly,
    uninitialize: FnHandleOnly,

    spi_master_init: FnSpiMasterInit,
    spi_master_set_mode: FnSpiMasterSetMode,
    spi_master_set_cs: FnSetU32,
    spi_master_set_lines: FnSetU32,
    spi_master_single_read: FnSpiSingle,
    spi_master_single_write: FnSpiSingle,
    spi_master_single_read_write: FnSpiSingleRw,
    spi_master_multi_read_write: FnSpiMultiRw,
    spi_reset: FnHandleOnly,
    spi_reset_transaction: FnSpiResetTransaction,
    spi_set_driving_strength: FnSpiSetDrivingStrength,

    _d2xx: Library,
    _ft4222: Library,
}

impl VendorLibrary {
    /// Load both vendor libraries and resolve every entry point.
    pub fn load() -> Result<Self> {
        let d2xx = unsafe { Library::new(D2XX_LIBRARY) }
            .map_err(|e| Error::Library(format!("{}: {}", D2XX_LIBRARY, e)))?;
        let ft4222 = unsafe { Library::new(FT4222_LIBRARY) }
            .map_err(|e| Error::Library(format!("{}: {}", FT4222_LIBRARY, e)))?;
        log::debug!("loaded {} and {}", D2XX_LIBRARY, FT4222_LIBRARY);

        Ok(Self {
            create_device_info_list: resolve!(d2xx, b"FT_CreateDeviceInfoList\0"),
            get_device_info_detail: resolve!(d2xx, b"FT_GetDeviceInfoDetail\0"),
            open_ex: resolve!(d2xx, b"FT_OpenEx\0"),
            close: resolve!(d2xx, b"FT_Close\0"),
            set_timeouts: resolve!(d2xx, b"FT_SetTimeouts\0"),
            reset_device: resolve!(d2xx, b"FT_ResetDevice\0"),

            get_version: resolve!(ft4222, b"FT4222_GetVersion\0"),
            set_clock: resolve!(ft4222, b"FT4222_SetClock\0"),
            get_clock: resolve!(ft4222, b"FT4222_GetClock\0"),
            set_wakeup_interrupt: resolve!(ft4222, b"FT4222_SetWakeUpInterrupt\0"),
            get_wakeup_interrupt: resolve!(ft4222, b"FT4222_GetWakeUpInterrupt\0"),
            set_interrupt_trigger: resolve!(ft4222, b"FT4222_SetInterruptTrigger\0"),
            set_suspend_out: resolve!(ft4222, b"FT4222_SetSuspendOut\0"),
            get_max_transfer_size: resolve!(ft4222, b"FT4222_GetMaxTransferSize\0"),
            get_chip_mode: resolve!(ft4222, b"FT4222_GetChipMode\0"),
            chip_reset: resolve!(ft4222, b"FT4222_ChipReset\0"),
            uninitialize: resolve!(ft4222, b"FT4222_UnInitialize\0"),

            spi_master_init: resolve!(ft4222, b"FT4222_SPIMaster_Init\0"),
            spi_master_set_mode: resolve!(ft4222, b"FT4222_SPIMaster_SetMode\0"),
            spi_master_set_cs: resolve!(ft4222, b"FT4222_SPIMaster_SetCS\0"),
            spi_master_set_lines: resolve!(ft4222, b"FT4222_SPIMaster_SetLines\0"),
            spi_master_single_read: resolve!(ft4222, b"FT4222_SPIMaster_SingleRead\0"),
            spi_master_single_write: resolve!(ft4222, b"FT4222_SPIMaster_SingleWrite\0"),
            spi_master_single_read_write: resolve!(ft4222, b"FT4222_SPIMaster_SingleReadWrite\0"),
            spi_master_multi_read_write: resolve!(ft4222, b"FT4222_SPIMaster_MultiReadWrite\0"),
            spi_reset: resolve!(ft4222, b"FT4222_SPI_Reset\0"),
            spi_reset_transaction: resolve!(ft4222, b"FT4222_SPI_ResetTransaction\0"),
            spi_set_driving_strength: resolve!(ft4222, b"FT4222_SPI_SetDrivingStrength\0"),

            _d2xx: d2xx,
            _ft4222: ft4222,
        })
    }
}

impl NativeDriver for VendorLibrary {
    fn create_device_info_list(&self, count: &mut u32) -> i32 {
        unsafe { (self.create_device_info_list)(count) }
    }

    fn get_device_info_detail(
        &self,
        index: u32,
        flags: &mut u32,
        device_type: &mut u32,
        id: &mut u32,
        location_id: &mut u32,
        serial: &mut [u8; 16],
        description: &mut [u8; 64],
        handle: &mut Handle,
    ) -> i32 {
        unsafe {
            (self.get_device_info_detail)(
                index,
                flags,
                device_type,
                id,
                location_id,
                serial.as_mut_ptr().cast(),
                description.as_mut_ptr().cast(),
                handle,
            )
        }
    }

    fn open_by_description(&self, description: &[u8; 64], handle: &mut Handle) -> i32 {
        unsafe {
            (self.open_ex)(
                description.as_ptr().cast(),
                FT_OPEN_BY_DESCRIPTION,
                handle,
            )
        }
    }

    fn close(&self, handle: Handle) -> i32 {
        unsafe { (self.close)(handle) }
    }

    fn set_timeouts(&self, handle: Handle, read_ms: u32, write_ms: u32) -> i32 {
        unsafe { (self.set_timeouts)(handle, read_ms, write_ms) }
    }

    fn reset_device(&self, handle: Handle) -> i32 {
        unsafe { (self.reset_device)(handle) }
    }

    fn get_version(&self, handle: Handle, chip_version: &mut u32, dll_version: &mut u32) -> i32 {
        let mut raw = RawVersion {
            chip_version: 0,
            dll_version: 0,
        };
        let status = unsafe { (self.get_version)(handle, &mut raw) };
        *chip_version = raw.chip_version;
        *dll_version = raw.dll_version;
        status
    }

    fn set_clock(&self, handle: Handle, clock: u8) -> i32 {
        unsafe { (self.set_clock)(handle, clock as i32) }
    }

    fn get_clock(&self, handle: Handle, clock: &mut u8) -> i32 {
        let mut raw: i32 = 0;
        let status = unsafe { (self.get_clock)(handle, &mut raw) };
        *clock = raw as u8;
        status
    }

    fn set_wakeup_interrupt(&self, handle: Handle, enable: bool) -> i32 {
        unsafe { (self.set_wakeup_interrupt)(handle, enable as i32) }
    }

    fn get_wakeup_interrupt(&self, handle: Handle, enable: &mut bool) -> i32 {
        let mut raw: i32 = 0;
        let status = unsafe { (self.get_wakeup_interrupt)(handle, &mut raw) };
        *enable = raw != 0;
        status
    }

    fn set_interrupt_trigger(&self, handle: Handle, trigger: u8) -> i32 {
        unsafe { (self.set_interrupt_trigger)(handle, trigger as i32) }
    }

    fn set_suspend_out(&self, handle: Handle, enable: bool) -> i32 {
        unsafe { (self.set_suspend_out)(handle, enable as i32) }
    }

    fn get_max_transfer_size(&self, handle: Handle, max_size: &mut u16) -> i32 {
        unsafe { (self.get_max_transfer_size)(handle, max_size) }
    }

    fn get_chip_mode(&self, handle: Handle, mode: &mut u8) -> i32 {
        unsafe { (self.get_chip_mode)(handle, mode) }
    }

    fn chip_reset(&self, handle: Handle) -> i32 {
        unsafe { (self.chip_reset)(handle) }
    }

    fn uninitialize(&self, handle: Handle) -> i32 {
        unsafe { (self.uninitialize)(handle) }
    }

    fn spi_master_init(
        &self,
        handle: Handle,
        io_mode: u8,
        clock: u8,
        cpol: u8,
        cpha: u8,
        cs_map: u8,
    ) -> i32 {
        unsafe {
            (self.spi_master_init)(
                handle,
                io_mode as i32,
                clock as i32,
                cpol as i32,
                cpha as i32,
                cs_map,
            )
        }
    }

    fn spi_master_set_mode(&self, handle: Handle, cpol: u8, cpha: u8) -> i32 {
        unsafe { (self.spi_master_set_mode)(handle, cpol as i32, cpha as i32) }
    }

    fn spi_master_set_cs(&self, handle: Handle, cs: u8) -> i32 {
        unsafe { (self.spi_master_set_cs)(handle, cs as i32) }
    }

    fn spi_master_set_lines(&self, handle: Handle, io_mode: u8) -> i32 {
        unsafe { (self.spi_master_set_lines)(handle, io_mode as i32) }
    }

    fn spi_master_single_read(
        &self,
        handle: Handle,
        buffer: &mut [u8],
        transferred: &mut u16,
    ) -> i32 {
        unsafe {
            (self.spi_master_single_read)(
                handle,
                buffer.as_mut_ptr(),
                buffer.len() as u16,
                transferred,
                1,
            )
        }
    }

    fn spi_master_single_write(&self, handle: Handle, buffer: &[u8], transferred: &mut u16) -> i32 {
        // The D2XX API takes a non-const buffer pointer but does not write
        // through it.
        unsafe {
            (self.spi_master_single_write)(
                handle,
                buffer.as_ptr() as *mut u8,
                buffer.len() as u16,
                transferred,
                1,
            )
        }
    }

    fn spi_master_single_read_write(
        &self,
        handle: Handle,
        read: &mut [u8],
        write: &[u8],
        transferred: &mut u16,
    ) -> i32 {
        unsafe {
            (self.spi_master_single_read_write)(
                handle,
                read.as_mut_ptr(),
                write.as_ptr() as *mut u8,
                write.len() as u16,
                transferred,
                1,
            )
        }
    }

    fn spi_master_multi_read_write(
        &self,
        handle: Handle,
        read: &mut [u8],
        write: &[u8],
        command_len: u8,
        data_len: u16,
        read_len: u16,
        transferred: &mut u16,
    ) -> i32 {
        unsafe {
            (self.spi_master_multi_read_write)(
                handle,
                read.as_mut_ptr(),
                write.as_ptr(),
                command_len,
                data_len,
                read_len,
                transferred,
            )
        }
    }

    fn spi_reset(&self, handle: Handle) -> i32 {
        unsafe { (self.spi_reset)(handle) }
    }

    fn spi_reset_transaction(&self, handle: Handle, index: u8) -> i32 {
        unsafe { (self.spi_reset_transaction)(handle, index) }
    }

    fn spi_set_driving_strength(&self, handle: Handle, clock: u8, io: u8, cs: u8) -> i32 {
        unsafe { (self.spi_set_driving_strength)(handle, clock as i32, io as i32, cs as i32) }
    }
}

static VENDOR: OnceCell<Arc<VendorLibrary>> = OnceCell::new();

/// The process-wide vendor library instance.
///
/// Loaded on first use and never unloaded. A failed load is not cached;
/// the next call retries.
pub fn system_driver() -> Result<Arc<dyn NativeDriver>> {
    let lib = VENDOR.get_or_try_init(|| VendorLibrary::load().map(Arc::new))?;
    let driver: Arc<dyn NativeDriver> = lib.clone();
    Ok(driver)
}
