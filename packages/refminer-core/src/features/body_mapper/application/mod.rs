pub mod mapper;
mod passes;
