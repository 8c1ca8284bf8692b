//! SPI master transfers against the stub native driver.
//!
//! The multi-phase scenarios mirror a flash-like register protocol: a
//! page-program style write and a fast-read with dummy cycles. The command
//! bytes are examples only; the layer moves raw bytes.

mod common;

use std::sync::Arc;

use common::{StubDriver, READ_FILL};
use ft4222_spi::{
    ClockDivisor, ClockPhase, ClockPolarity, CsPolarity, DrivingStrength, Error, Ft4222, IoMode,
    SpiConfig, SpiMaster,
};

fn quad_config() -> SpiConfig {
    SpiConfig::new()
        .with_io_mode(IoMode::Quad)
        .with_clock(ClockDivisor::Div64)
        .with_mode(ClockPolarity::IdleLow, ClockPhase::Leading)
        .with_cs_map(0x01)
}

fn open_chip(driver: &Arc<StubDriver>) -> Ft4222 {
    Ft4222::open_with_driver(driver.clone()).unwrap()
}

#[test]
fn write_only_register_transaction() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    // write 0x5A to address 0x12345678
    let cmd = [0x02, 0x12, 0x34, 0x56, 0x78, 0x5A];
    let read = spi.multi_read_write(&cmd, 0, 0, cmd.len()).unwrap();
    assert!(read.is_empty());
    assert_eq!(driver.multi_calls(), 1);
}

#[test]
fn read_transaction_returns_requested_bytes() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    // fast read of 4 bytes from 0x12345678, 4 dummy cycles
    let cmd = [0x0B, 0x12, 0x34, 0x56, 0x78, 0xFF, 0xFF, 0xFF, 0xFF];
    let read = spi.multi_read_write(&cmd, 4, 0, cmd.len()).unwrap();
    assert_eq!(read, vec![READ_FILL; 4]);
}

#[test]
fn phase_limits_fail_before_any_native_call() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    let data = [0u8; 8];
    for (read_len, command_len, data_len) in [(65536, 0, 8), (0, 16, 8), (0, 0, 65536)] {
        let err = spi
            .multi_read_write(&data, read_len, command_len, data_len)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)), "{:?}", err);
    }
    assert_eq!(driver.multi_calls(), 0);
}

#[test]
fn undersized_write_buffer_fails_locally() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    let err = spi.multi_read_write(&[0x02, 0x00], 0, 2, 4).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
    assert_eq!(driver.multi_calls(), 0);
}

#[test]
fn phase_limits_pass_at_the_boundary() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    let data = vec![0u8; 15 + 65535];
    let read = spi.multi_read_write(&data, 65535, 15, 65535).unwrap();
    assert_eq!(read.len(), 65535);
    assert_eq!(driver.multi_calls(), 1);
}

#[test]
fn single_read_fills_requested_length() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    let read = spi.single_read(16).unwrap();
    assert_eq!(read, vec![READ_FILL; 16]);

    let err = spi.single_read(65536).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
}

#[test]
fn single_write_accepts_up_to_limit() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    spi.single_write(&[0x06]).unwrap();
    spi.single_write(&vec![0u8; 65535]).unwrap();
    let err = spi.single_write(&vec![0u8; 65536]).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
}

#[test]
fn full_duplex_receives_one_byte_per_byte_sent() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    let tx = [0x9F, 0x00, 0x00, 0x00];
    let rx = spi.single_read_write(&tx).unwrap();
    assert_eq!(rx.len(), tx.len());
    assert_eq!(rx, tx); // stub echoes
}

#[test]
fn runtime_reconfiguration_updates_config() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    spi.set_mode(ClockPolarity::IdleHigh, ClockPhase::Trailing)
        .unwrap();
    assert_eq!(spi.config().cpol, ClockPolarity::IdleHigh);
    assert_eq!(spi.config().cpha, ClockPhase::Trailing);

    spi.set_lines(IoMode::Single).unwrap();
    assert_eq!(spi.config().io_mode, IoMode::Single);

    spi.set_cs(CsPolarity::ActiveLow).unwrap();
}

#[test]
fn engine_resets_and_driving_strength() {
    let driver = Arc::new(StubDriver::with_ft4222());
    let chip = open_chip(&driver);
    let mut spi = SpiMaster::new(&chip, quad_config()).unwrap();

    spi.reset().unwrap();
    spi.reset_transaction(0).unwrap();
    spi.set_driving_strength(
        DrivingStrength::Ds8Ma,
        DrivingStrength::Ds8Ma,
        DrivingStrength::Ds4Ma,
    )
    .unwrap();
}
