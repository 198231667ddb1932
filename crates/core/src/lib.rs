//! Referential integrity and payment reconciliation engine.
//!
//! This crate keeps a web of loosely coupled financial records (invoices,
//! suppliers, employees, checks, bank transfers, cash/bank ledgers, payslips)
//! mutually consistent as records are created, paid, deleted, or edited, and
//! links heterogeneous payment instruments to the obligations they settle.
//!
//! # Modules
//!
//! - `model` - Domain entities and state enums
//! - `store` - Entity store contract and in-memory implementation
//! - `integrity` - Delete gating: cascade, soft-delete, rejection
//! - `propagation` - Denormalized field propagation on master edits
//! - `payment` - Payment registration and check lifecycle
//! - `reconciliation` - Bank transfer to invoice/payslip matching
//!
//! All services hold an injected [`store::EntityStore`] so callers can run
//! against a SQL-backed adapter in production and [`store::MemoryStore`] in
//! tests or embedded deployments.

pub mod integrity;
pub mod model;
pub mod payment;
pub mod propagation;
pub mod reconciliation;
pub mod store;
