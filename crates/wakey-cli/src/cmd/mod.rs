pub mod alarm;
pub mod next;
pub mod serve;
pub mod stations;
