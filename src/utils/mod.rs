pub mod keep_awake;
pub mod logging;
pub mod shutdown;

pub use keep_awake::KeepAwake;
pub use shutdown::ShutdownSignal;
