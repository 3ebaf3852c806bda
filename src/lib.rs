pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod reflow;
pub mod sys;

#[cfg(test)]
mod testing;
