//! Request extractors resolving who is calling.
//!
//! Authentication itself happens upstream; by the time a request reaches this service the
//! caller's tenant is attached as a header.

pub mod tenant;

#[cfg(test)]
mod test;
