//! Transport implementation using the `serial2` crate.

use std::time::Duration;

/// Re-exported `serial2` crate in case you need to modify serial port settings.
pub use serial2;

impl crate::Transport for serial2::SerialPort {
	type Error = std::io::Error;

	fn connect(port: &str, baud_rate: u32) -> Result<Self, Self::Error> {
		serial2::SerialPort::open(port, baud_rate)
	}

	fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
		let mut settings = self.get_configuration()?;
		settings.set_baud_rate(baud_rate)?;
		self.set_configuration(&settings)?;
		Ok(())
	}

	fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
		// Zero timeouts are not portable, so keep the wait strictly positive.
		self.set_read_timeout(timeout.max(Duration::from_millis(1)))?;
		serial2::SerialPort::read(self, buffer)
	}

	fn write(&mut self, buffer: &[u8], timeout: Duration) -> Result<usize, Self::Error> {
		self.set_write_timeout(timeout.max(Duration::from_millis(1)))?;
		serial2::SerialPort::write(self, buffer)
	}

	fn flush(&mut self) -> Result<(), Self::Error> {
		serial2::SerialPort::flush(self)
	}

	fn is_timeout_error(error: &Self::Error) -> bool {
		error.kind() == std::io::ErrorKind::TimedOut
	}
}
