mod build;
mod clean;
mod info;
mod init;
mod provision;
mod verify_tag;

pub use build::{BuildOptions, cmd_build};
pub use clean::cmd_clean;
pub use info::cmd_info;
pub use init::cmd_init;
pub use provision::cmd_provision;
pub use verify_tag::cmd_verify_tag;
