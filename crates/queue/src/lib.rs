pub mod delayed;
pub mod dispatcher;
pub mod error;
pub mod promoter;
pub mod ready;
pub mod registry;
pub mod store;

pub use dispatcher::Dispatcher;
pub use error::{BrokerError, BrokerResult};
pub use registry::QueueConfig;
pub use store::Store;
