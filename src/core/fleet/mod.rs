pub mod manager;
pub mod template;
pub mod transport;

pub use manager::FleetManager;
pub use template::{TemplateSpec, TransportTemplate};
pub use transport::Transport;
