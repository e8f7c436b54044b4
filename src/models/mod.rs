mod donor;
mod notification;
mod payment;
mod trail_entry;

pub use donor::*;
pub use notification::*;
pub use payment::*;
pub use trail_entry::*;
