//! Named thread spawning for the long-lived loops.
//!
//! Every loop runs on its own OS thread with an explicit name (visible in
//! `top -H`, panics and debuggers) and a bounded stack.

use std::io;
use std::thread::JoinHandle;

/// Spawn `f` on a thread called `name` with a `stack_kb` KiB stack.
pub fn spawn_task(
    name: &'static str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::info!("Spawning '{}' (stack={}KB)", name, stack_kb);
    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
