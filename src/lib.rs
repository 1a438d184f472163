pub mod clustering;
pub mod loader;
pub mod logging;

pub const TARGET_CLUSTER: &str = "cluster";
pub const TARGET_LOADER: &str = "loader";
