use core::time::Duration;

use crate::{ConfigError, OpenError, ReadError, Transport, WriteError};

/// The lifecycle state of a [`SerialHandle`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PortState {
	/// The handle owns an open native transport.
	Open,

	/// The transport has been released by an explicit close.
	///
	/// The handle can be re-opened with [`SerialHandle::open()`].
	Closed,

	/// The transport has been released by the finalizer.
	///
	/// A released handle can never be opened again.
	Released,
}

/// Timeout configuration for reads and writes, in milliseconds.
///
/// A read of `n` bytes may block until `read_constant + read_multiplier * n`
/// milliseconds have elapsed without data, or until `inter_byte` milliseconds
/// pass between two received bytes, whichever triggers first.
/// The same logic applies to writes with the write fields.
///
/// All fields default to zero.
/// Transports with a single timeout knob per call approximate the inter-byte
/// timeout with a total budget: `constant + multiplier * n`, falling back to
/// `inter_byte` when that total is zero.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Timeouts {
	/// Maximum milliseconds between two successive received bytes.
	pub inter_byte: u32,

	/// Constant part of the read budget.
	pub read_constant: u32,

	/// Per-requested-byte part of the read budget.
	pub read_multiplier: u32,

	/// Constant part of the write budget.
	pub write_constant: u32,

	/// Per-written-byte part of the write budget.
	pub write_multiplier: u32,
}

impl Timeouts {
	/// Timeouts with the given inter-byte timeout and all other fields zero.
	pub fn from_inter_byte(milliseconds: u32) -> Self {
		Self {
			inter_byte: milliseconds,
			..Self::default()
		}
	}

	/// The total blocking budget for a read of `length` bytes.
	pub fn read_budget(&self, length: usize) -> Duration {
		Self::budget(self.inter_byte, self.read_constant, self.read_multiplier, length)
	}

	/// The total blocking budget for a write of `length` bytes.
	pub fn write_budget(&self, length: usize) -> Duration {
		Self::budget(self.inter_byte, self.write_constant, self.write_multiplier, length)
	}

	fn budget(inter_byte: u32, constant: u32, multiplier: u32, length: usize) -> Duration {
		let total = u64::from(constant).saturating_add(u64::from(multiplier).saturating_mul(length as u64));
		if total == 0 {
			Duration::from_millis(u64::from(inter_byte))
		} else {
			Duration::from_millis(total)
		}
	}
}

/// One serial port connection.
///
/// The handle owns at most one native transport at a time and releases it
/// exactly once, either through [`Self::close()`] / [`Self::release()`] or by
/// being dropped.
/// Releasing is infallible and idempotent, so it is safe to call from a
/// finalizer.
pub struct SerialHandle<T> {
	/// The port name the transport was (or will be) acquired with.
	port: String,

	/// The configured baud rate.
	baud_rate: u32,

	/// The configured timeout parameters.
	timeouts: Timeouts,

	/// The native transport, present exactly while the state is `Open`.
	transport: Option<T>,

	/// The lifecycle state of the handle.
	state: PortState,
}

impl<T> std::fmt::Debug for SerialHandle<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SerialHandle")
			.field("port", &self.port)
			.field("baud_rate", &self.baud_rate)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl<T: Transport> SerialHandle<T> {
	/// Open a serial port with the given baud rate.
	///
	/// The native transport is acquired immediately.
	/// The port name must be non-empty and the baud rate must be positive.
	pub fn new(port: impl Into<String>, baud_rate: u32) -> Result<Self, OpenError<T::Error>> {
		let port = port.into();
		if port.is_empty() {
			return Err(OpenError::InvalidPort);
		}
		if baud_rate == 0 {
			return Err(OpenError::InvalidBaudRate(baud_rate));
		}

		let transport = T::connect(&port, baud_rate).map_err(OpenError::Connect)?;
		log::debug!("opened serial port {} at {} baud", port, baud_rate);
		Ok(Self {
			port,
			baud_rate,
			timeouts: Timeouts::default(),
			transport: Some(transport),
			state: PortState::Open,
		})
	}

	/// Re-acquire the native transport using the stored port name and baud rate.
	///
	/// Fails if the handle is already open or has been finalized.
	/// On failure the handle stays closed.
	pub fn open(&mut self) -> Result<(), OpenError<T::Error>> {
		match self.state {
			PortState::Open => return Err(OpenError::AlreadyOpen),
			PortState::Released => return Err(OpenError::Finalized),
			PortState::Closed => (),
		}

		let transport = T::connect(&self.port, self.baud_rate).map_err(OpenError::Connect)?;
		log::debug!("re-opened serial port {} at {} baud", self.port, self.baud_rate);
		self.transport = Some(transport);
		self.state = PortState::Open;
		Ok(())
	}

	/// Release the native transport if the handle owns one.
	///
	/// Never fails, and calling it on an already closed handle is a no-op.
	pub fn close(&mut self) {
		if self.transport.take().is_some() {
			log::debug!("closed serial port {}", self.port);
		}
		if self.state == PortState::Open {
			self.state = PortState::Closed;
		}
	}

	/// Release the native transport and mark the handle as finalized.
	///
	/// Never fails and never signals; this is the finalizer path.
	/// A released handle cannot be re-opened.
	pub fn release(&mut self) {
		self.close();
		self.state = PortState::Released;
	}

	/// Read up to `max_len` bytes received within the configured timeout window.
	///
	/// The returned buffer holds exactly the bytes that were received, never
	/// more than `max_len`.
	/// A timeout is not an error: it yields a short or empty buffer.
	pub fn read(&mut self, max_len: usize) -> Result<Vec<u8>, ReadError<T::Error>> {
		let timeout = self.timeouts.read_budget(max_len);
		let transport = self.transport.as_mut().ok_or(ReadError::NotOpen)?;
		if max_len == 0 {
			return Ok(Vec::new());
		}

		let mut buffer = vec![0; max_len];
		match transport.read(&mut buffer, timeout) {
			Ok(count) => {
				log::trace!("read {} bytes from {}", count.min(max_len), self.port);
				buffer.truncate(count);
				Ok(buffer)
			},
			Err(e) if T::is_timeout_error(&e) => Ok(Vec::new()),
			Err(e) => Err(ReadError::Read(e)),
		}
	}

	/// Write `data` to the transport, respecting the configured write timeouts.
	///
	/// Returns the number of bytes written.
	/// A partial write caused by an expired timeout is not an error.
	pub fn write(&mut self, data: &[u8]) -> Result<usize, WriteError<T::Error>> {
		let timeout = self.timeouts.write_budget(data.len());
		let transport = self.transport.as_mut().ok_or(WriteError::NotOpen)?;

		let mut written = 0;
		while written < data.len() {
			match transport.write(&data[written..], timeout) {
				Ok(0) => break,
				Ok(count) => written += count,
				Err(e) if T::is_timeout_error(&e) => break,
				Err(e) => return Err(WriteError::Write(e)),
			}
		}
		log::trace!("wrote {} of {} bytes to {}", written, data.len(), self.port);
		Ok(written)
	}

	/// Block until all pending output has been transmitted.
	pub fn flush(&mut self) -> Result<(), WriteError<T::Error>> {
		let transport = self.transport.as_mut().ok_or(WriteError::NotOpen)?;
		transport.flush().map_err(WriteError::Flush)
	}

	/// Change the baud rate of the open port.
	///
	/// The transport decides which rates are supported.
	/// The stored rate, used when re-opening, is only updated if the
	/// transport accepts the new rate.
	pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), ConfigError<T::Error>> {
		let transport = self.transport.as_mut().ok_or(ConfigError::NotOpen)?;
		transport.set_baud_rate(baud_rate).map_err(ConfigError::Transport)?;
		self.baud_rate = baud_rate;
		Ok(())
	}

	/// Replace the timeout configuration of the open port.
	pub fn set_timeouts(&mut self, timeouts: Timeouts) -> Result<(), ConfigError<T::Error>> {
		if self.transport.is_none() {
			return Err(ConfigError::NotOpen);
		}
		self.timeouts = timeouts;
		Ok(())
	}
}

impl<T> SerialHandle<T> {
	/// The port name the handle was created with.
	pub fn port(&self) -> &str {
		&self.port
	}

	/// The currently configured baud rate.
	pub fn baud_rate(&self) -> u32 {
		self.baud_rate
	}

	/// The currently configured timeout parameters.
	pub fn timeouts(&self) -> Timeouts {
		self.timeouts
	}

	/// The lifecycle state of the handle.
	pub fn state(&self) -> PortState {
		self.state
	}

	/// Check if the handle currently owns an open transport.
	pub fn is_open(&self) -> bool {
		self.state == PortState::Open
	}
}
