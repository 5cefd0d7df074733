pub mod workerd;

pub use workerd::{WorkerdInstance, WorkerdRuntime};
