pub mod estpos;
pub mod payflex;
pub mod posnet;

pub use estpos::EstPos;
pub use payflex::PayFlexV4;
pub use posnet::PosNetV1;
