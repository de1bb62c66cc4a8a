//! Ranking of scored search targets.

pub mod topk;
