#![cfg(test)]

mod console;
mod interrupt;
mod machine;
mod memory;
mod ports;
mod timer;

// RUST_LOG controls output; repeated calls are fine.
pub fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}
