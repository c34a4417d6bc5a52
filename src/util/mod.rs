pub mod debounce;
pub mod guard;
pub mod toast;
pub mod validate;
