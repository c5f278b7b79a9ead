//! Store engine implementations for the CRM record types.

use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::sync::{Entity, IdPolicy};

use super::types::{Category, Contact, Deal, Employee, Lead, Product, Task};

// ============================================================================
// Entity implementations
// ============================================================================

impl Entity for Contact {
  fn collection() -> &'static str {
    "contacts"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

impl Entity for Lead {
  fn collection() -> &'static str {
    "leads"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

impl Entity for Deal {
  fn collection() -> &'static str {
    "deals"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

impl Entity for Task {
  fn collection() -> &'static str {
    "tasks"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

impl Entity for Product {
  fn collection() -> &'static str {
    "products"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

impl Entity for Category {
  fn collection() -> &'static str {
    "categories"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

impl Entity for Employee {
  fn collection() -> &'static str {
    "employees"
  }

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = Some(id);
  }
}

// ============================================================================
// Employee identifier policy
// ============================================================================

/// Identifier policy for employees: wall-clock `_id` plus a human-readable
/// `EMP-NNNN` code.
///
/// The next code is one past the highest numeric suffix in the persisted
/// collection or handed out so far, whichever is larger. A deleted
/// employee's code is never reissued within the store's lifetime.
pub struct EmployeeCode {
  last: AtomicU32,
}

impl EmployeeCode {
  pub fn new() -> Self {
    Self {
      last: AtomicU32::new(0),
    }
  }
}

impl Default for EmployeeCode {
  fn default() -> Self {
    Self::new()
  }
}

impl IdPolicy<Employee> for EmployeeCode {
  fn assign(&self, record: &mut Employee, existing: &[Employee]) {
    record.set_id(Utc::now().timestamp_millis());

    let persisted_max = existing
      .iter()
      .filter_map(|e| e.code.as_deref().and_then(code_number))
      .max()
      .unwrap_or(0);

    // Single writer: load/store is enough here.
    let next = self.last.load(Ordering::Relaxed).max(persisted_max) + 1;
    self.last.store(next, Ordering::Relaxed);

    record.code = Some(format!("EMP-{:04}", next));
  }
}

/// Numeric suffix of an employee code ("EMP-0012" -> 12).
fn code_number(code: &str) -> Option<u32> {
  code.strip_prefix("EMP-")?.parse().ok()
}
