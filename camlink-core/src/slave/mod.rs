//! Slave side: command dispatch over the SPI slave link

pub mod dispatcher;

pub use dispatcher::Dispatcher;
