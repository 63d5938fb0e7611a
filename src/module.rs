use crate::{ScriptError, SerialHandle, Timeouts, Transport, TypeError};

/// The type tag under which serial handles are registered with the host runtime.
pub const SERIAL_TYPE_TAG: u32 = 0x5345_5249;

/// A reference to an object registered with a host runtime.
///
/// References are small `Copy` values the host stores and passes back to the
/// binding surface.
/// The type tag identifies which binding registered the object, and the
/// generation detects references that outlived their object: both are checked
/// on every use, before any native resource is touched.
///
/// Hosts mint references for their own object types with [`ObjectRef::new()`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ObjectRef {
	type_tag: u32,
	index: u32,
	generation: u32,
}

impl ObjectRef {
	/// Create a reference from its raw parts.
	pub fn new(type_tag: u32, index: u32, generation: u32) -> Self {
		Self {
			type_tag,
			index,
			generation,
		}
	}

	/// The type tag carried by this reference.
	pub fn type_tag(&self) -> u32 {
		self.type_tag
	}

	/// The slot index carried by this reference.
	pub fn index(&self) -> u32 {
		self.index
	}

	/// The slot generation carried by this reference.
	pub fn generation(&self) -> u32 {
		self.generation
	}
}

struct Slot<T> {
	generation: u32,
	handle: Option<SerialHandle<T>>,
}

macro_rules! make_module_struct {
	($($DefaultTransport:ty)?) => {
		/// The serial binding surface exposed to a host runtime.
		///
		/// The module owns every live [`SerialHandle`] in a generation-checked
		/// slot table and exposes one method per host-visible operation.
		/// Every failure is translated into a [`ScriptError`] before it
		/// crosses the boundary; no native error escapes a module method.
		///
		/// The host's garbage collector must call [`Self::finalize()`] when a
		/// reference returned by [`Self::create()`] becomes unreachable.
		/// Finalization is optional for handles that were explicitly closed,
		/// but always safe.
		///
		/// If the `"serial2"` feature is enabled, the `T` generic type argument defaults to [`serial2::SerialPort`].
		/// If it is not enabled, the `T` argument must always be specified.
		pub struct SerialModule<T $(= $DefaultTransport)?>
		where
			T: crate::Transport,
		{
			slots: Vec<Slot<T>>,
		}
	};
}

#[cfg(feature = "serial2")]
make_module_struct!(serial2::SerialPort);

#[cfg(not(feature = "serial2"))]
make_module_struct!();

impl<T: Transport> std::fmt::Debug for SerialModule<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SerialModule")
			.field("live_handles", &self.live_handles())
			.finish_non_exhaustive()
	}
}

impl<T: Transport> Default for SerialModule<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Transport> SerialModule<T> {
	/// Create an empty binding surface with no registered handles.
	pub fn new() -> Self {
		Self { slots: Vec::new() }
	}

	/// Host operation `new`: open a port and register a new serial handle.
	///
	/// The returned reference is tagged with [`SERIAL_TYPE_TAG`] so the host
	/// can route it back to this module and recognize it for finalization.
	pub fn create(&mut self, port: &str, baud_rate: u32) -> Result<ObjectRef, ScriptError> {
		let handle = SerialHandle::new(port, baud_rate)?;
		Ok(self.register(handle))
	}

	/// Host operation `open`: re-acquire the native transport of a closed handle.
	pub fn open(&mut self, obj: ObjectRef) -> Result<(), ScriptError> {
		self.lookup(obj)?.open()?;
		Ok(())
	}

	/// Host operation `close`: release the native transport.
	///
	/// Once the reference has passed the type check this cannot fail:
	/// closing an already closed handle is a no-op.
	pub fn close(&mut self, obj: ObjectRef) -> Result<(), ScriptError> {
		self.lookup(obj)?.close();
		Ok(())
	}

	/// Host operation `read`: read up to `max_len` bytes.
	///
	/// The returned buffer is sized to the bytes actually received.
	/// A timeout yields a short or empty buffer, not an error.
	pub fn read(&mut self, obj: ObjectRef, max_len: usize) -> Result<Vec<u8>, ScriptError> {
		let data = self.lookup(obj)?.read(max_len)?;
		Ok(data)
	}

	/// Host operation `write`: push a byte sequence to the port.
	///
	/// The bytes are borrowed from the host; no copy is made by the binding.
	pub fn write(&mut self, obj: ObjectRef, data: &[u8]) -> Result<(), ScriptError> {
		self.lookup(obj)?.write(data)?;
		Ok(())
	}

	/// Host operation `flush`: block until pending output has drained.
	pub fn flush(&mut self, obj: ObjectRef) -> Result<(), ScriptError> {
		self.lookup(obj)?.flush()?;
		Ok(())
	}

	/// Host operation `setBaudrate`: change the line speed of an open handle.
	pub fn set_baudrate(&mut self, obj: ObjectRef, baud_rate: u32) -> Result<(), ScriptError> {
		self.lookup(obj)?.set_baud_rate(baud_rate)?;
		Ok(())
	}

	/// Host operation `setTimeout`: replace the timeout configuration.
	pub fn set_timeout(&mut self, obj: ObjectRef, timeouts: Timeouts) -> Result<(), ScriptError> {
		self.lookup(obj)?.set_timeouts(timeouts)?;
		Ok(())
	}

	/// Finalizer hook, called by the host's garbage collector when a
	/// reference becomes unreachable.
	///
	/// Releases the handle's native transport if it was not already released,
	/// frees the slot, and invalidates outstanding copies of the reference.
	/// Never signals a failure: invalid and stale references are ignored.
	pub fn finalize(&mut self, obj: ObjectRef) {
		let handle = match self.lookup(obj) {
			Ok(handle) => handle,
			Err(_) => return,
		};
		handle.release();
		log::trace!("finalized serial handle for port {}", handle.port());

		let slot = &mut self.slots[obj.index as usize];
		slot.handle = None;
		slot.generation = slot.generation.wrapping_add(1);
	}

	/// The number of currently registered handles.
	pub fn live_handles(&self) -> usize {
		self.slots.iter().filter(|slot| slot.handle.is_some()).count()
	}

	/// Resolve a reference to its handle, checking tag, index and generation.
	fn lookup(&mut self, obj: ObjectRef) -> Result<&mut SerialHandle<T>, TypeError> {
		TypeError::check(obj.type_tag, SERIAL_TYPE_TAG)?;
		self.slots
			.get_mut(obj.index as usize)
			.filter(|slot| slot.generation == obj.generation)
			.and_then(|slot| slot.handle.as_mut())
			.ok_or(TypeError { actual: obj.type_tag })
	}

	/// Register a handle in a free slot, or grow the table.
	fn register(&mut self, handle: SerialHandle<T>) -> ObjectRef {
		let index = match self.slots.iter().position(|slot| slot.handle.is_none()) {
			Some(index) => {
				self.slots[index].handle = Some(handle);
				index
			},
			None => {
				self.slots.push(Slot {
					generation: 0,
					handle: Some(handle),
				});
				self.slots.len() - 1
			},
		};
		ObjectRef {
			type_tag: SERIAL_TYPE_TAG,
			index: index as u32,
			generation: self.slots[index].generation,
		}
	}
}

/// Host operation `sleep`: block the calling thread for the given number of milliseconds.
///
/// Unrelated to any handle; delegates to the platform's blocking delay.
pub fn sleep(milliseconds: u64) {
	std::thread::sleep(std::time::Duration::from_millis(milliseconds));
}
