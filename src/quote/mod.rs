//! Quote request pipeline: validation of the submitted form, then composition
//! of the outbound email.

pub mod composer;
pub mod model;
pub mod validator;

pub use composer::{Composer, MessageIdentity};
pub use model::{OutboundMessage, ValidatedFields};
pub use validator::validate;
