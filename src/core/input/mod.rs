pub mod preprocess;
pub mod scenario;

pub use preprocess::strip_comments;
pub use scenario::Scenario;
