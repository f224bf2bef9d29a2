pub mod interrupt;
pub mod io;
pub mod machine;
pub mod memory;
pub mod ports;
pub mod profile;

pub use interrupt::{InterruptController, LineConfig, Trigger};
pub use io::PortDevice;
pub use machine::{Cpu, EmuError, ExecRet, Machine};
pub use memory::{MemError, Memory};
pub use ports::{PortDispatcher, PortError, PortMap};
pub use profile::Profile;
