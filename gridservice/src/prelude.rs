pub use crate::{
    config::*,
    driver::*,
    errors::*,
    logging::*,
    platform::{local::*, options::*, traits::*},
    worker::*,
};
