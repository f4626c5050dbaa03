pub mod collect;
pub mod run;
pub mod status;
