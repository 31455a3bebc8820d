//! Общие DTO между backend дашборда продаж и слоем представления.

pub mod dashboards;
pub mod domain;
