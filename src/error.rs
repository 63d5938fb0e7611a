/// An error that can occur while acquiring the native serial transport.
#[derive(Debug)]
pub enum OpenError<E> {
	/// The port name is empty.
	InvalidPort,

	/// The baud rate is zero or not representable by the transport.
	InvalidBaudRate(u32),

	/// The handle already owns an open transport.
	AlreadyOpen,

	/// The handle has been finalized and can no longer be opened.
	Finalized,

	/// The transport refused to open the device.
	Connect(E),
}

/// An error that can occur while reconfiguring a serial handle.
#[derive(Debug)]
pub enum ConfigError<E> {
	/// The handle does not currently own an open transport.
	NotOpen,

	/// The transport rejected the new configuration.
	Transport(E),
}

/// An error that can occur while reading from a serial handle.
///
/// A timeout is not an error and never produces one of these:
/// it results in a short (possibly empty) read instead.
#[derive(Debug)]
pub enum ReadError<E> {
	/// The handle does not currently own an open transport.
	NotOpen,

	/// The transport faulted while reading.
	Read(E),
}

/// An error that can occur while writing to or flushing a serial handle.
///
/// A timeout is not an error and never produces one of these:
/// it results in a partial write instead.
#[derive(Debug)]
pub enum WriteError<E> {
	/// The handle does not currently own an open transport.
	NotOpen,

	/// The transport faulted while writing.
	Write(E),

	/// The transport faulted while draining pending output.
	Flush(E),
}

/// A reference passed to the binding surface is not a live serial handle.
///
/// Raised before any native resource is touched.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TypeError {
	/// The type tag carried by the offending reference.
	pub actual: u32,
}

impl TypeError {
	/// Check that a reference carries the expected type tag.
	pub fn check(actual: u32, expected: u32) -> Result<(), Self> {
		if actual == expected {
			Ok(())
		} else {
			Err(Self { actual })
		}
	}
}

/// An error reported back to the host runtime.
///
/// The host sees a single error category carrying a human-readable
/// diagnostic message, exactly as the native layer reported it.
/// The more specific error types in this module exist to guide the
/// resource handle implementation and are folded into this one at the
/// binding surface.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScriptError {
	message: String,
}

impl ScriptError {
	/// Create a new error from a diagnostic message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}

	/// The diagnostic message to surface to the host runtime.
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl<E> std::error::Error for OpenError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl<E> std::error::Error for ConfigError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl<E> std::error::Error for ReadError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl<E> std::error::Error for WriteError<E> where E: std::fmt::Debug + std::fmt::Display {}
impl std::error::Error for TypeError {}
impl std::error::Error for ScriptError {}

impl<E: std::fmt::Display> From<OpenError<E>> for ScriptError {
	fn from(other: OpenError<E>) -> Self {
		Self::new(other.to_string())
	}
}

impl<E: std::fmt::Display> From<ConfigError<E>> for ScriptError {
	fn from(other: ConfigError<E>) -> Self {
		Self::new(other.to_string())
	}
}

impl<E: std::fmt::Display> From<ReadError<E>> for ScriptError {
	fn from(other: ReadError<E>) -> Self {
		Self::new(other.to_string())
	}
}

impl<E: std::fmt::Display> From<WriteError<E>> for ScriptError {
	fn from(other: WriteError<E>) -> Self {
		Self::new(other.to_string())
	}
}

impl From<TypeError> for ScriptError {
	fn from(other: TypeError) -> Self {
		Self::new(other.to_string())
	}
}

impl<E: std::fmt::Display> std::fmt::Display for OpenError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::InvalidPort => write!(f, "invalid port name: name may not be empty"),
			Self::InvalidBaudRate(baud) => write!(f, "invalid baud rate: {}", baud),
			Self::AlreadyOpen => write!(f, "serial port already open"),
			Self::Finalized => write!(f, "serial handle already finalized"),
			Self::Connect(e) => write!(f, "failed to open serial port: {}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for ConfigError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::NotOpen => write!(f, "serial port not open"),
			Self::Transport(e) => write!(f, "failed to configure serial port: {}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for ReadError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::NotOpen => write!(f, "serial port not open"),
			Self::Read(e) => write!(f, "failed to read from serial port: {}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for WriteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::NotOpen => write!(f, "serial port not open"),
			Self::Write(e) => write!(f, "failed to write to serial port: {}", e),
			Self::Flush(e) => write!(f, "failed to flush serial port: {}", e),
		}
	}
}

impl std::fmt::Display for TypeError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "not a serial handle (type tag {:#010X})", self.actual)
	}
}

impl std::fmt::Display for ScriptError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.message)
	}
}
