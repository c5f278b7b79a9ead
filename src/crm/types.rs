//! CRM record types.
//!
//! Field names serialize to the camelCase wire format the backend speaks;
//! identifiers keep their `_id` name on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  pub email: String,
  pub phone: String,
  pub company: String,
  pub status: ContactStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
  Active,
  Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  pub email: String,
  pub phone: String,
  pub company: String,
  pub status: LeadStatus,
  pub source: LeadSource,
  /// Estimated value of the lead
  pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
  New,
  Contacted,
  Qualified,
  Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
  Website,
  Referral,
  Social,
  Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  pub company: String,
  pub value: f64,
  pub stage: DealStage,
  /// Chance of closing, in percent
  pub probability: f64,
  pub expected_close_date: String,
  pub owner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
  Proposal,
  Negotiation,
  Contract,
  Closed,
  Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub title: String,
  pub description: String,
  pub due_date: String,
  pub status: TaskStatus,
  pub priority: TaskPriority,
  pub assigned_to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
  Pending,
  InProgress,
  Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  pub item_code: String,
  pub description: String,
  pub unit: String,
  pub brand: String,
  pub cost_price: f64,
  pub selling_price: f64,
  /// Kept numeric (0/1) to match the wire format
  pub is_stock_item: i64,
  pub has_batch: bool,
  pub has_serial: bool,
  pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_category: Option<String>,
  pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  /// Human-readable code, e.g. "EMP-0002". Assigned on creation in demo
  /// mode; not the uniqueness key.
  #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  pub name: String,
  pub department: String,
  pub position: String,
  pub hire_date: String,
  pub email: String,
}
