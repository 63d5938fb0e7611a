//! [`Transport`] trait to support different native serial implementations.

use core::time::Duration;

#[cfg(feature = "serial2")]
pub mod serial2;

/// A native serial transport used by a [`SerialHandle`][crate::SerialHandle].
///
/// The transport is the black box that performs the actual device I/O.
/// It owns the OS-level resource from [`Self::connect()`] until it is dropped,
/// and it is the authority on which baud rates the device supports.
///
/// The implementor must configure the serial line to use 8 bit characters, 1 stop bit, no parity and no flow control.
pub trait Transport: Sized {
	/// The error type reported by the native serial implementation.
	///
	/// The [`Display`][std::fmt::Display] output is the diagnostic text that
	/// eventually reaches the host runtime, so it should describe the fault
	/// the way the OS reported it.
	type Error: std::fmt::Display;

	/// Acquire the device at `port` and configure it for `baud_rate`.
	fn connect(port: &str, baud_rate: u32) -> Result<Self, Self::Error>;

	/// Change the baud rate of the open device.
	fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), Self::Error>;

	/// Read available bytes into `buffer`, blocking up to `timeout`.
	///
	/// Returns the number of bytes read.
	/// An expired timeout is reported as an error for which [`Self::is_timeout_error()`] returns true.
	fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;

	/// Write bytes from `buffer`, blocking up to `timeout`.
	///
	/// Returns the number of bytes written, which may be less than the buffer length.
	fn write(&mut self, buffer: &[u8], timeout: Duration) -> Result<usize, Self::Error>;

	/// Block until all pending output has been transmitted.
	fn flush(&mut self) -> Result<(), Self::Error>;

	/// Check if an error indicates a timeout.
	fn is_timeout_error(error: &Self::Error) -> bool;
}
