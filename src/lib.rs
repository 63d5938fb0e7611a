//! Serial port bindings for embedding scripting hosts.
//!
//! This crate adapts a native serial transport to the object lifecycle and
//! error model of an embedding host runtime:
//!
//! * [`SerialHandle`] owns one open-or-closed native serial connection and
//!   guarantees that the underlying device resource is released exactly once,
//!   whether through an explicit close or through finalization.
//! * [`SerialModule`] is the binding surface: it registers handles in a
//!   type-tagged, generation-checked table, validates every [`ObjectRef`] the
//!   host passes back, and translates every native failure into a
//!   [`ScriptError`] carrying the original diagnostic text.
//! * [`Transport`] is the seam to the native serial library.
//!   The `"serial2"` feature (enabled by default) implements it for
//!   `serial2::SerialPort`.
//!
//! Timeouts are configuration, not errors: an expired read deadline yields a
//! short or empty buffer and an expired write deadline a partial write.
//!
//! The host runtime is expected to call all operations on one handle from a
//! single logical thread, and to invoke [`SerialModule::finalize()`] when a
//! handle reference becomes unreachable.
//!
//! ```no_run
//! use serialbind::{SerialModule, Timeouts};
//!
//! fn main() -> Result<(), serialbind::ScriptError> {
//! 	let mut serial: SerialModule = SerialModule::new();
//! 	let modem = serial.create("/dev/ttyUSB0", 9600)?;
//! 	serial.set_timeout(modem, Timeouts::from_inter_byte(50))?;
//! 	serial.write(modem, b"AT\r\n")?;
//! 	serial.flush(modem)?;
//! 	let reply = serial.read(modem, 64)?;
//! 	println!("modem says: {:?}", reply);
//! 	serial.close(modem)?;
//! 	Ok(())
//! }
//! ```

mod error;
mod handle;
mod module;
pub mod transport;

pub use error::{ConfigError, OpenError, ReadError, ScriptError, TypeError, WriteError};
pub use handle::{PortState, SerialHandle, Timeouts};
pub use module::{sleep, ObjectRef, SerialModule, SERIAL_TYPE_TAG};
pub use transport::Transport;
