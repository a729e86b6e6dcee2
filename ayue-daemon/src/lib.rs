//! ayue daemon: live reconcile loop, build queue and control socket.

mod error;
pub mod paths;
pub mod protocol;
mod runtime;
pub mod watch;

pub use error::DaemonError;
pub use protocol::{
    request_build, request_hot_update, request_status, request_stop, send_request, DaemonRequest,
    DaemonResponse,
};
pub use runtime::{init_tracing, run, start_blocking};
pub use watch::EventStream;
