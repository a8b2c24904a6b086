pub mod ids;
pub mod kda;
pub mod region;
