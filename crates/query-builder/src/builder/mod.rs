pub mod copy;
pub mod create_table;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
