pub use crate::{
    core::{asset::*, request::*, results::*},
    distribution::{resultaggregator::*, taskpartitioner::*},
    math::normalsource::*,
    models::basketsimulator::*,
    protocol::{enums::*, jsoncodec::*, linecodec::*, traits::*},
    utils::errors::*,
};
