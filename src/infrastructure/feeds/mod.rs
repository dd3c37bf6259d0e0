pub mod http;
pub mod scoreinside;
