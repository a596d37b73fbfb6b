//! Turn-around-time engine: business calendar arithmetic, case
//! classification and the customer → branch → case notification tree.

pub mod ack;
pub mod calendar;
pub mod classifier;
pub mod delay;
pub mod due_date;
pub mod hierarchy;
pub mod service;
