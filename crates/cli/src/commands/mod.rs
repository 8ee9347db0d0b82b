pub mod export;
pub mod init;
pub mod inspect;
pub mod run;
pub mod validate;
