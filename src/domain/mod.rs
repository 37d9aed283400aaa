mod account;
mod catalog;
mod emi;
mod history;
mod money;
mod stock;

pub use account::*;
pub use catalog::*;
pub use emi::*;
pub use history::*;
pub use money::*;
pub use stock::*;
