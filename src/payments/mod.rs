//! Payment gateways and webhook authentication.

pub mod mercadopago;
pub mod signature;

pub use mercadopago::MercadoPagoClient;
