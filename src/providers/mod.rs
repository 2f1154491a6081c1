pub mod backend;
pub mod util;

pub use backend::BackendClient;
