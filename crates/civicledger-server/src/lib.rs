pub mod audit;
pub mod handlers;
pub mod state;
pub mod storage;
