pub mod receive_values_on;

pub use receive_values_on::ReceiveValuesOn;
