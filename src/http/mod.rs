pub mod cards;
pub mod countries;
pub mod health;
pub mod routes;
