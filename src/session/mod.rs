mod launch;
mod tube;

pub use launch::{
    connect_remote, gdb_script, launch_gdb, launch_local, start, terminal_argv, LaunchMode,
};
pub use tube::Tube;
