#![feature(iterator_try_collect)]

pub(crate) mod error;
pub mod hive;
pub(crate) mod uhp;

#[allow(unused)]
pub mod prelude
{
    pub use std::str::FromStr;

    pub use log::{self};

    pub use crate::{
        error::{Error, Kind, Result},
        hive::*,
        uhp::{Server, UhpOptions},
    };
}
