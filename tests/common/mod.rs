//! In-memory stand-in for the vendor libraries.
//!
//! Implements [`NativeDriver`] over a scripted device table so the whole
//! stack can be exercised without hardware: reads fill with a fixed
//! pattern, full-duplex transfers echo, and call counters back the
//! no-native-call assertions.

#![allow(dead_code)]

use std::sync::Mutex;

use ft4222_spi::{Handle, NativeDriver};

const FT_OK: i32 = 0;
const FT_INVALID_HANDLE: i32 = 1;
const FT_DEVICE_NOT_FOUND: i32 = 2;

pub const READ_FILL: u8 = 0xA5;

/// One scripted entry in the stub's device table.
#[derive(Clone)]
pub struct StubDevice {
    pub flags: u32,
    pub device_type: u32,
    pub id: u32,
    pub location_id: u32,
    pub serial: &'static str,
    pub description: &'static str,
    pub handle: Handle,
}

impl StubDevice {
    /// A closed device enumerating under the given description.
    pub fn closed(description: &'static str) -> Self {
        Self {
            flags: 0,
            device_type: 10,
            id: 0x0403_601C,
            location_id: 0x2111,
            serial: "A",
            description,
            handle: 0,
        }
    }

    /// A device the descriptor already reports as open.
    pub fn already_open(description: &'static str, handle: Handle) -> Self {
        Self {
            flags: 0x1,
            handle,
            ..Self::closed(description)
        }
    }
}

#[derive(Default)]
struct StubState {
    open: Vec<Handle>,
    clock: u8,
    wakeup: bool,
    open_calls: u32,
    close_calls: u32,
    multi_calls: u32,
    uninit_calls: u32,
}

pub struct StubDriver {
    devices: Vec<StubDevice>,
    chip_version: u32,
    dll_version: u32,
    state: Mutex<StubState>,
}

impl StubDriver {
    pub fn new(devices: Vec<StubDevice>) -> Self {
        Self {
            devices,
            chip_version: 0x4222_0200,
            dll_version: 0x0104_0000,
            state: Mutex::new(StubState {
                // 48 MHz system clock, the chip's power-up default
                clock: 2,
                ..StubState::default()
            }),
        }
    }

    /// Single closed FT4222 in SPI-capable mode.
    pub fn with_ft4222() -> Self {
        Self::new(vec![StubDevice::closed("FT4222 A")])
    }

    pub fn with_chip_version(mut self, chip_version: u32) -> Self {
        self.chip_version = chip_version;
        self
    }

    pub fn with_dll_version(mut self, dll_version: u32) -> Self {
        self.dll_version = dll_version;
        self
    }

    pub fn open_calls(&self) -> u32 {
        self.state.lock().unwrap().open_calls
    }

    pub fn close_calls(&self) -> u32 {
        self.state.lock().unwrap().close_calls
    }

    pub fn multi_calls(&self) -> u32 {
        self.state.lock().unwrap().multi_calls
    }

    pub fn uninit_calls(&self) -> u32 {
        self.state.lock().unwrap().uninit_calls
    }

    pub fn open_handles(&self) -> usize {
        self.state.lock().unwrap().open.len()
    }

    fn check_handle(&self, handle: Handle) -> i32 {
        if self.state.lock().unwrap().open.contains(&handle) {
            FT_OK
        } else {
            FT_INVALID_HANDLE
        }
    }
}

fn write_padded(out: &mut [u8], s: &str) {
    out.fill(0);
    out[..s.len()].copy_from_slice(s.as_bytes());
}

impl NativeDriver for StubDriver {
    fn create_device_info_list(&self, count: &mut u32) -> i32 {
        *count = self.devices.len() as u32;
        FT_OK
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
        let Some(dev) = self.devices.get(index as usize) else {
            return FT_DEVICE_NOT_FOUND;
        };
        *flags = dev.flags;
        *device_type = dev.device_type;
        *id = dev.id;
        *location_id = dev.location_id;
        write_padded(serial, dev.serial);
        write_padded(description, dev.description);
        *handle = dev.handle;
        FT_OK
    }

    fn open_by_description(&self, description: &[u8; 64], handle: &mut Handle) -> i32 {
        let mut state = self.state.lock().unwrap();
        state.open_calls += 1;
        let end = description
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(description.len());
        let wanted = &description[..end];
        for (i, dev) in self.devices.iter().enumerate() {
            if dev.description.as_bytes() == wanted {
                let h = 0x100 + i;
                state.open.push(h);
                *handle = h;
                return FT_OK;
            }
        }
        FT_DEVICE_NOT_FOUND
    }

    fn close(&self, handle: Handle) -> i32 {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;
        match state.open.iter().position(|&h| h == handle) {
            Some(i) => {
                state.open.remove(i);
                FT_OK
            }
            None => FT_INVALID_HANDLE,
        }
    }

    fn set_timeouts(&self, handle: Handle, _read_ms: u32, _write_ms: u32) -> i32 {
        self.check_handle(handle)
    }

    fn reset_device(&self, handle: Handle) -> i32 {
        self.check_handle(handle)
    }

    fn get_version(&self, handle: Handle, chip_version: &mut u32, dll_version: &mut u32) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            *chip_version = self.chip_version;
            *dll_version = self.dll_version;
        }
        status
    }

    fn set_clock(&self, handle: Handle, clock: u8) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            self.state.lock().unwrap().clock = clock;
        }
        status
    }

    fn get_clock(&self, handle: Handle, clock: &mut u8) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            *clock = self.state.lock().unwrap().clock;
        }
        status
    }

    fn set_wakeup_interrupt(&self, handle: Handle, enable: bool) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            self.state.lock().unwrap().wakeup = enable;
        }
        status
    }

    fn get_wakeup_interrupt(&self, handle: Handle, enable: &mut bool) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            *enable = self.state.lock().unwrap().wakeup;
        }
        status
    }

    fn set_interrupt_trigger(&self, handle: Handle, _trigger: u8) -> i32 {
        self.check_handle(handle)
    }

    fn set_suspend_out(&self, handle: Handle, _enable: bool) -> i32 {
        self.check_handle(handle)
    }

    fn get_max_transfer_size(&self, handle: Handle, max_size: &mut u16) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            *max_size = u16::MAX;
        }
        status
    }

    fn get_chip_mode(&self, handle: Handle, mode: &mut u8) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            *mode = 0;
        }
        status
    }

    fn chip_reset(&self, handle: Handle) -> i32 {
        self.check_handle(handle)
    }

    fn uninitialize(&self, handle: Handle) -> i32 {
        self.state.lock().unwrap().uninit_calls += 1;
        self.check_handle(handle)
    }

    fn spi_master_init(
        &self,
        handle: Handle,
        _io_mode: u8,
        _clock: u8,
        _cpol: u8,
        _cpha: u8,
        _cs_map: u8,
    ) -> i32 {
        self.check_handle(handle)
    }

    fn spi_master_set_mode(&self, handle: Handle, _cpol: u8, _cpha: u8) -> i32 {
        self.check_handle(handle)
    }

    fn spi_master_set_cs(&self, handle: Handle, _cs: u8) -> i32 {
        self.check_handle(handle)
    }

    fn spi_master_set_lines(&self, handle: Handle, _io_mode: u8) -> i32 {
        self.check_handle(handle)
    }

    fn spi_master_single_read(
        &self,
        handle: Handle,
        buffer: &mut [u8],
        transferred: &mut u16,
    ) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            buffer.fill(READ_FILL);
            *transferred = buffer.len() as u16;
        }
        status
    }

    fn spi_master_single_write(&self, handle: Handle, buffer: &[u8], transferred: &mut u16) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            *transferred = buffer.len() as u16;
        }
        status
    }

    fn spi_master_single_read_write(
        &self,
        handle: Handle,
        read: &mut [u8],
        write: &[u8],
        transferred: &mut u16,
    ) -> i32 {
        let status = self.check_handle(handle);
        if status == FT_OK {
            read.copy_from_slice(write);
            *transferred = write.len() as u16;
        }
        status
    }

    fn spi_master_multi_read_write(
        &self,
        handle: Handle,
        read: &mut [u8],
        _write: &[u8],
        _command_len: u8,
        _data_len: u16,
        read_len: u16,
        transferred: &mut u16,
    ) -> i32 {
        self.state.lock().unwrap().multi_calls += 1;
        let status = self.check_handle(handle);
        if status == FT_OK {
            read[..read_len as usize].fill(READ_FILL);
            *transferred = read_len;
        }
        status
    }

    fn spi_reset(&self, handle: Handle) -> i32 {
        self.check_handle(handle)
    }

    fn spi_reset_transaction(&self, handle: Handle, _index: u8) -> i32 {
        self.check_handle(handle)
    }

    fn spi_set_driving_strength(&self, handle: Handle, _clock: u8, _io: u8, _cs: u8) -> i32 {
        self.check_handle(handle)
    }
}
