//! Wire formats spoken on either side of the translation layer

pub mod agent;
pub mod openai;
