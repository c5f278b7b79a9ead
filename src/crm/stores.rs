//! Store instantiations, one per CRM collection.

use std::sync::Arc;

use crate::sync::{Context, Store, TimestampId};

use super::activity::ActivityFeed;
use super::records::EmployeeCode;
use super::types::{Category, Contact, Deal, Employee, Lead, Product, Task};

/// All collection stores over one shared context.
///
/// Each store owns its cache; the session flags and the HTTP client are
/// shared. Employees get their own identifier policy, everything else uses
/// wall-clock ids.
pub struct CrmStores {
  pub contacts: Store<Contact>,
  pub leads: Store<Lead>,
  pub deals: Store<Deal>,
  pub tasks: Store<Task>,
  pub products: Store<Product>,
  pub categories: Store<Category>,
  pub employees: Store<Employee>,
  pub activities: ActivityFeed,
}

impl CrmStores {
  pub fn new(ctx: &Context) -> Self {
    Self {
      contacts: Store::new(ctx, Arc::new(TimestampId)),
      leads: Store::new(ctx, Arc::new(TimestampId)),
      deals: Store::new(ctx, Arc::new(TimestampId)),
      tasks: Store::new(ctx, Arc::new(TimestampId)),
      products: Store::new(ctx, Arc::new(TimestampId)),
      categories: Store::new(ctx, Arc::new(TimestampId)),
      employees: Store::new(ctx, Arc::new(EmployeeCode::new())),
      activities: ActivityFeed::new(ctx),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::crm::ContactStatus;
  use crate::session::Session;
  use crate::storage::MemoryStorage;

  fn demo_stores() -> CrmStores {
    let session = Session::new(Arc::new(MemoryStorage::new()));
    session.set_demo(true).unwrap();
    let ctx = Context::new(session, "http://127.0.0.1:1").unwrap();
    CrmStores::new(&ctx)
  }

  fn employee(name: &str) -> Employee {
    Employee {
      id: None,
      code: None,
      name: name.to_string(),
      department: "Sales".to_string(),
      position: "Rep".to_string(),
      hire_date: "2026-01-15".to_string(),
      email: format!("{}@example.com", name),
    }
  }

  #[tokio::test]
  async fn test_employee_codes_survive_deletion() {
    let stores = demo_stores();

    let mut suffixes = Vec::new();
    let mut ids = Vec::new();
    for name in ["ada", "bob", "cid"] {
      let created = stores.employees.add(employee(name)).await.unwrap();
      let code = created.code.unwrap();
      suffixes.push(code.strip_prefix("EMP-").unwrap().parse::<u32>().unwrap());
      ids.push(created.id.unwrap());
    }
    assert_eq!(suffixes, vec![1, 2, 3]);

    stores.employees.delete(ids[1]).await.unwrap();

    let next = stores.employees.add(employee("dee")).await.unwrap();
    let next_suffix: u32 = next
      .code
      .unwrap()
      .strip_prefix("EMP-")
      .unwrap()
      .parse()
      .unwrap();

    assert!(suffixes.iter().all(|&s| next_suffix > s));
  }

  #[tokio::test]
  async fn test_collections_are_isolated() {
    let stores = demo_stores();

    let contact = stores
      .contacts
      .add(Contact {
        id: None,
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        phone: "555-0100".to_string(),
        company: "Acme".to_string(),
        status: ContactStatus::Active,
      })
      .await
      .unwrap();

    // Collections are isolated: the contact write does not leak into leads.
    stores.leads.fetch_all().await.unwrap();
    assert!(stores.leads.records().is_empty());
    assert_eq!(stores.contacts.records().len(), 1);
    assert!(contact.id.is_some());
  }
}
