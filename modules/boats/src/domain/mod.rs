pub mod aggregate;
pub mod error;
pub mod invitations;
pub mod membership;
pub mod ports;
pub mod repo;
pub mod service;
pub mod validation;
