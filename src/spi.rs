//! SPI master transaction layer
//!
//! [`SpiMaster`] borrows an open [`Ft4222`] for its whole life, so the
//! handle can never outlive the chip that owns it. Construction configures
//! master mode; afterwards the four transfer primitives and the runtime
//! reconfiguration calls are available. Every call blocks until the
//! physical transaction completes and nothing here retries; serialization
//! across threads is the caller's job.

use crate::device::Ft4222;
use crate::error::{check, Error, Result};
use crate::protocol::{
    ClockPhase, ClockPolarity, CsPolarity, DrivingStrength, IoMode, SpiConfig,
    MULTI_IO_MAX_COMMAND, MULTI_IO_MAX_DATA, SINGLE_IO_MAX_DATA,
};

/// SPI master bound to an open chip.
pub struct SpiMaster<'a> {
    chip: &'a Ft4222,
    config: SpiConfig,
}

impl<'a> SpiMaster<'a> {
    /// Configure the chip for SPI master mode.
    ///
    /// Must run before any transfer; the chip rejects transfer calls in
    /// other interface modes with `FT4222_IS_NOT_SPI_MODE`.
    pub fn new(chip: &'a Ft4222, config: SpiConfig) -> Result<Self> {
        check(chip.driver().spi_master_init(
            chip.handle(),
            config.io_mode.lines(),
            config.clock.value(),
            config.cpol.value(),
            config.cpha.value(),
            config.cs_map,
        ))?;
        log::debug!(
            "SPI master up: {:?}, div {}, cpol {:?}, cpha {:?}, cs map 0x{:02x}",
            config.io_mode,
            config.clock.divisor(),
            config.cpol,
            config.cpha,
            config.cs_map
        );
        Ok(Self { chip, config })
    }

    /// Current configuration, as last applied.
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Change clock polarity and phase.
    pub fn set_mode(&mut self, cpol: ClockPolarity, cpha: ClockPhase) -> Result<()> {
        check(
            self.chip
                .driver()
                .spi_master_set_mode(self.chip.handle(), cpol.value(), cpha.value()),
        )?;
        self.config.cpol = cpol;
        self.config.cpha = cpha;
        Ok(())
    }

    /// Change the chip select polarity.
    pub fn set_cs(&mut self, cs: CsPolarity) -> Result<()> {
        check(
            self.chip
                .driver()
                .spi_master_set_cs(self.chip.handle(), cs.value()),
        )
    }

    /// Change the I/O line mode.
    pub fn set_lines(&mut self, mode: IoMode) -> Result<()> {
        check(
            self.chip
                .driver()
                .spi_master_set_lines(self.chip.handle(), mode.lines()),
        )?;
        self.config.io_mode = mode;
        Ok(())
    }

    /// Blocking single-phase read of `len` bytes.
    ///
    /// Returns the bytes actually transferred; a short transfer comes back
    /// truncated and is logged at warn level.
    pub fn single_read(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > SINGLE_IO_MAX_DATA {
            return Err(Error::InvalidParameter(format!(
                "read length {} exceeds maximum {}",
                len, SINGLE_IO_MAX_DATA
            )));
        }
        let mut buffer = vec![0u8; len];
        let mut transferred = 0u16;
        check(self.chip.driver().spi_master_single_read(
            self.chip.handle(),
            &mut buffer,
            &mut transferred,
        ))?;
        if (transferred as usize) < len {
            log::warn!("short read: {} of {} bytes", transferred, len);
            buffer.truncate(transferred as usize);
        }
        Ok(buffer)
    }

    /// Blocking single-phase write.
    pub fn single_write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > SINGLE_IO_MAX_DATA {
            return Err(Error::InvalidParameter(format!(
                "write length {} exceeds maximum {}",
                data.len(),
                SINGLE_IO_MAX_DATA
            )));
        }
        let mut transferred = 0u16;
        check(self.chip.driver().spi_master_single_write(
            self.chip.handle(),
            data,
            &mut transferred,
        ))
    }

    /// Blocking full-duplex transfer; receives as many bytes as it sends.
    pub fn single_read_write(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() > SINGLE_IO_MAX_DATA {
            return Err(Error::InvalidParameter(format!(
                "transfer length {} exceeds maximum {}",
                data.len(),
                SINGLE_IO_MAX_DATA
            )));
        }
        let mut buffer = vec![0u8; data.len()];
        let mut transferred = 0u16;
        check(self.chip.driver().spi_master_single_read_write(
            self.chip.handle(),
            &mut buffer,
            data,
            &mut transferred,
        ))?;
        if (transferred as usize) < data.len() {
            log::warn!("short transfer: {} of {} bytes", transferred, data.len());
            buffer.truncate(transferred as usize);
        }
        Ok(buffer)
    }

    /// Multi-phase command/data transfer for register-style protocols.
    ///
    /// `data` carries `command_len` command bytes followed by `data_len`
    /// payload bytes; `read_len` bytes are clocked in after the write
    /// phases. Phase lengths are validated here, before any native call:
    /// the command phase is a 4-bit field (max 15 bytes), the data and read
    /// phases 16-bit fields (max 65535 bytes each).
    pub fn multi_read_write(
        &mut self,
        data: &[u8],
        read_len: usize,
        command_len: usize,
        data_len: usize,
    ) -> Result<Vec<u8>> {
        if read_len > MULTI_IO_MAX_DATA {
            return Err(Error::InvalidParameter(format!(
                "read phase {} exceeds maximum {}",
                read_len, MULTI_IO_MAX_DATA
            )));
        }
        if command_len > MULTI_IO_MAX_COMMAND {
            return Err(Error::InvalidParameter(format!(
                "command phase {} exceeds maximum {}",
                command_len, MULTI_IO_MAX_COMMAND
            )));
        }
        if data_len > MULTI_IO_MAX_DATA {
            return Err(Error::InvalidParameter(format!(
                "data phase {} exceeds maximum {}",
                data_len, MULTI_IO_MAX_DATA
            )));
        }
        if data.len() < command_len + data_len {
            return Err(Error::InvalidParameter(format!(
                "write buffer holds {} bytes, phases need {}",
                data.len(),
                command_len + data_len
            )));
        }

        let mut buffer = vec![0u8; read_len];
        let mut transferred = 0u16;
        check(self.chip.driver().spi_master_multi_read_write(
            self.chip.handle(),
            &mut buffer,
            data,
            command_len as u8,
            data_len as u16,
            read_len as u16,
            &mut transferred,
        ))?;
        if (transferred as usize) < read_len {
            log::warn!("short read phase: {} of {} bytes", transferred, read_len);
            buffer.truncate(transferred as usize);
        }
        Ok(buffer)
    }

    /// Clear the SPI engine state.
    pub fn reset(&mut self) -> Result<()> {
        check(self.chip.driver().spi_reset(self.chip.handle()))
    }

    /// Clear one logical transaction slot.
    pub fn reset_transaction(&mut self, index: u8) -> Result<()> {
        check(
            self.chip
                .driver()
                .spi_reset_transaction(self.chip.handle(), index),
        )
    }

    /// Set the electrical driving strength of the three signal groups.
    pub fn set_driving_strength(
        &mut self,
        clock: DrivingStrength,
        io: DrivingStrength,
        cs: DrivingStrength,
    ) -> Result<()> {
        check(self.chip.driver().spi_set_driving_strength(
            self.chip.handle(),
            clock.value(),
            io.value(),
            cs.value(),
        ))
    }
}
