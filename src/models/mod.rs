pub mod ticket;
pub mod trip;
