mod catalog;
mod common;
mod validation;
