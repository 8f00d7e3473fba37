pub mod operator;
pub mod participant;
pub mod partner;
pub mod question_package;
pub mod resource;
pub mod schedule;
pub mod types;
