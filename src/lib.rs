pub mod config;
pub mod content;
pub mod domain;
pub mod paths;
pub mod services;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub mod testing;
