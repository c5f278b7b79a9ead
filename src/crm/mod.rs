//! CRM domain: record types, identifier policies and store instantiations.

mod activity;
mod records;
mod stores;
mod types;

pub use activity::{Activity, ActivityFeed};
pub use records::EmployeeCode;
pub use stores::CrmStores;
pub use types::{
  Category, Contact, ContactStatus, Deal, DealStage, Employee, Lead, LeadSource, LeadStatus,
  Product, Task, TaskPriority, TaskStatus,
};
