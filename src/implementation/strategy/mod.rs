//! The four trial strategies. Each is a free function operating on a
//! [`NodeGraph`](crate::NodeGraph) rather than a trait object: the hot loop
//! benefits from static dispatch, and [`TrialDriver`](crate::TrialDriver)
//! already carries a [`Strategy`](crate::implementation::config::Strategy)
//! tag to pick which one to call.

pub mod rtdp;
pub mod lrtdp;
pub mod hdp;
pub mod frtdp;
