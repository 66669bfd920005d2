pub mod credentials;
pub mod paths;

pub use credentials::ApiKey;
pub use paths::AppPaths;
