//! Process-wide state shared by the supervisor and workers.

mod state;

pub use state::{
    is_shutdown, register_server, register_shutdown_listener, setup_shutdown_handler,
};
