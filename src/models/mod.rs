pub mod coupon;
pub mod package;

pub use coupon::*;
pub use package::*;
