pub mod call;
pub mod channels;
pub mod serve;
