pub mod broadcast;
pub mod connections;
pub mod drafts;
pub mod episodes;
pub mod feed;
pub mod health;
pub mod objects;
