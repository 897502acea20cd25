#![allow(dead_code)]

pub mod fakes;
pub mod test_utils;
