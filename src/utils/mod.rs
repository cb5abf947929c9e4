pub mod extract;
pub mod middleware;
pub mod validation;
