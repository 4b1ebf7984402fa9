pub mod errors;
pub mod execution;
pub mod fleet;
pub mod graph;
pub mod input;
pub mod orders;
pub mod places;
pub mod types;

#[cfg(test)]
mod tests;
