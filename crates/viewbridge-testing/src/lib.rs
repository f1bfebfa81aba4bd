//! Testing utilities and harness for viewbridge

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
}
