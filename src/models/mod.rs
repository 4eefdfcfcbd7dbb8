pub mod achievement;
pub mod assignment;
pub mod journal;
pub mod mood;
pub mod note;
pub mod user;
