// HTTP handlers

pub mod direct;
