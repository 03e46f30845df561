pub mod assets;
pub mod catalog;
pub mod chat;
pub mod errors;
pub mod events;
pub mod gallery;
pub mod storage;
pub mod studio;
pub mod theme;
