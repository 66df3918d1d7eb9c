#[macro_use]
mod util;

mod sync;
