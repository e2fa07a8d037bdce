pub mod command_executor;
pub mod command_timeout;
pub mod test_helpers;

pub use command_executor::{execute_command, execute_shell, CommandOptions, CommandOutput};
