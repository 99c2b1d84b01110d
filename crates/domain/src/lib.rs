pub mod checkout;
pub mod contact;
pub mod content;
pub mod locale;
pub mod registrar;
pub mod setting;
