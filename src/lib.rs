pub mod config;
pub mod excel;
pub mod export;
pub mod payroll;
pub mod pipeline;
