#![forbid(unsafe_code)]

pub mod functions;
pub mod gen_wrappers;
