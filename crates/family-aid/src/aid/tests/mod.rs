mod common;
mod questions;
mod territory;
