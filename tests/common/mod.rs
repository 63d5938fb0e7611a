//! Mock serial transport for exercising the binding without hardware.
//!
//! Mock devices are registered per test thread under a port name with
//! [`install_port()`].
//! [`MockTransport::connect()`] looks the device up by name, so the code
//! under test can acquire it the same way it would acquire a real port.
//! The returned [`PortProbe`] lets the test queue incoming bytes, inspect
//! written bytes and watch the acquisition counters.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serialbind::Transport;

thread_local! {
	static PORTS: RefCell<HashMap<String, Arc<Mutex<PortInner>>>> = RefCell::new(HashMap::new());
}

struct PortInner {
	baud_rate: u32,

	/// Bytes queued for the code under test to read.
	rx: VecDeque<u8>,

	/// Bytes the code under test has written.
	tx: Vec<u8>,

	/// Total bytes the device accepts before write attempts time out.
	tx_capacity: Option<usize>,

	/// When set, every I/O call reports a device fault.
	faulty: bool,

	/// Number of currently live connections (0 or 1, the device is exclusive).
	live: u32,

	/// Total number of successful acquisitions.
	opens: u32,

	/// Total number of releases.
	releases: u32,
}

/// Test-side handle to a registered mock device.
#[derive(Clone)]
pub struct PortProbe {
	inner: Arc<Mutex<PortInner>>,
}

impl PortProbe {
	/// Number of currently live connections to the device.
	pub fn live_connections(&self) -> u32 {
		self.inner.lock().unwrap().live
	}

	/// Total number of times the device has been acquired.
	pub fn total_opens(&self) -> u32 {
		self.inner.lock().unwrap().opens
	}

	/// Total number of times a connection to the device has been released.
	pub fn total_releases(&self) -> u32 {
		self.inner.lock().unwrap().releases
	}

	/// The baud rate the device was last configured with.
	pub fn baud_rate(&self) -> u32 {
		self.inner.lock().unwrap().baud_rate
	}

	/// Queue bytes for the code under test to read.
	pub fn push_rx(&self, data: &[u8]) {
		self.inner.lock().unwrap().rx.extend(data.iter().copied());
	}

	/// All bytes written to the device so far.
	pub fn written(&self) -> Vec<u8> {
		self.inner.lock().unwrap().tx.clone()
	}

	/// Limit the total number of bytes the device accepts.
	///
	/// Writes beyond the limit time out.
	pub fn set_tx_capacity(&self, capacity: usize) {
		self.inner.lock().unwrap().tx_capacity = Some(capacity);
	}

	/// Make every subsequent I/O call report a device fault.
	pub fn set_faulty(&self, faulty: bool) {
		self.inner.lock().unwrap().faulty = faulty;
	}
}

/// Register a mock device under `name` for the current test thread.
pub fn install_port(name: &str) -> PortProbe {
	let _ = env_logger::builder().is_test(true).try_init();
	let inner = Arc::new(Mutex::new(PortInner {
		baud_rate: 0,
		rx: VecDeque::new(),
		tx: Vec::new(),
		tx_capacity: None,
		faulty: false,
		live: 0,
		opens: 0,
		releases: 0,
	}));
	PORTS.with(|ports| {
		ports.borrow_mut().insert(name.to_string(), inner.clone());
	});
	PortProbe { inner }
}

/// A mock serial transport bound to a device registered with [`install_port()`].
pub struct MockTransport {
	name: String,
	inner: Arc<Mutex<PortInner>>,
}

impl Drop for MockTransport {
	fn drop(&mut self) {
		let mut inner = self.inner.lock().unwrap();
		inner.live -= 1;
		inner.releases += 1;
		log::trace!("{} released", self.name);
	}
}

impl Transport for MockTransport {
	type Error = Error;

	fn connect(port: &str, baud_rate: u32) -> Result<Self, Self::Error> {
		let inner = PORTS
			.with(|ports| ports.borrow().get(port).cloned())
			.ok_or_else(|| Error::new(ErrorKind::NotFound, format!("no such device: {}", port)))?;

		let mut state = inner.lock().unwrap();
		if state.live > 0 {
			return Err(Error::new(ErrorKind::Other, format!("device busy: {}", port)));
		}
		if baud_rate == 0 {
			return Err(Error::new(ErrorKind::InvalidInput, format!("unsupported baud rate: {}", baud_rate)));
		}
		state.baud_rate = baud_rate;
		state.live += 1;
		state.opens += 1;
		drop(state);

		log::trace!("{} acquired at {} baud", port, baud_rate);
		Ok(Self {
			name: port.to_string(),
			inner,
		})
	}

	fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
		if baud_rate == 0 {
			return Err(Error::new(ErrorKind::InvalidInput, format!("unsupported baud rate: {}", baud_rate)));
		}
		self.inner.lock().unwrap().baud_rate = baud_rate;
		Ok(())
	}

	fn read(&mut self, buffer: &mut [u8], _timeout: Duration) -> Result<usize, Self::Error> {
		let mut inner = self.inner.lock().unwrap();
		if inner.faulty {
			return Err(Error::new(ErrorKind::BrokenPipe, "device reports fault"));
		}
		// A silent device: the timeout expires immediately.
		if inner.rx.is_empty() {
			return Err(ErrorKind::TimedOut.into());
		}
		let len = buffer.len().min(inner.rx.len());
		for slot in &mut buffer[..len] {
			*slot = inner.rx.pop_front().unwrap();
		}
		Ok(len)
	}

	fn write(&mut self, buffer: &[u8], _timeout: Duration) -> Result<usize, Self::Error> {
		let mut inner = self.inner.lock().unwrap();
		if inner.faulty {
			return Err(Error::new(ErrorKind::BrokenPipe, "device reports fault"));
		}
		let room = match inner.tx_capacity {
			Some(capacity) => capacity.saturating_sub(inner.tx.len()),
			None => buffer.len(),
		};
		if room == 0 {
			return Err(ErrorKind::TimedOut.into());
		}
		let len = buffer.len().min(room);
		let (accepted, _) = buffer.split_at(len);
		inner.tx.extend_from_slice(accepted);
		Ok(len)
	}

	fn flush(&mut self) -> Result<(), Self::Error> {
		let inner = self.inner.lock().unwrap();
		if inner.faulty {
			return Err(Error::new(ErrorKind::BrokenPipe, "device reports fault"));
		}
		Ok(())
	}

	fn is_timeout_error(error: &Self::Error) -> bool {
		error.kind() == ErrorKind::TimedOut
	}
}
