//! Polyclinic
//!
//! Authorization core for a medical clinic booking backend, with a
//! role-based rules engine and a gated service layer over a pluggable
//! store.
//!
//! ## Features
//!
//! - **Three-gate authorization** - a coarse action table, per-record
//!   ownership rules, and visibility scope filters executed by the store
//! - **Typed roles** - admin, doctor, and patient carried as identity
//!   links on one principal; dual identity is two role memberships
//! - **Distinct error taxonomy** - `Denied`, `NotFound`, and
//!   `Unauthenticated` never blur into each other
//! - **Doctor-initiated booking** - a guarded custom operation that
//!   refuses vacationing doctors before any write
//! - **Async store seam** - the `ClinicStore` trait with a bundled
//!   in-memory reference implementation
//!
//! ## Decision model
//!
//! ```text
//! coarse action table → object ownership rules → scope filter
//! ```
//!
//! Admin principals pass every gate first and unconditionally. The
//! public directory kinds (doctors, departments, availability) are
//! readable without authentication; everything else requires a
//! principal, and anonymous callers get `Unauthenticated`, never a
//! denial.
//!
//! ## Example
//!
//! ```
//! use polyclinic::principal::{Authn, Principal, UserId};
//! use polyclinic::records::NewPatient;
//! use polyclinic::service::ClinicService;
//! use polyclinic::store::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> polyclinic::Result<()> {
//! let clinic = ClinicService::new(MemoryStore::new());
//!
//! // The doctor directory is public; no authentication needed.
//! let doctors = clinic.list_doctors(&Authn::Anonymous).await?;
//! assert!(doctors.is_empty());
//!
//! // An administrator provisions a patient profile for user 2.
//! let admin = Authn::from(Principal::admin(UserId(1)));
//! let profile = clinic
//!     .create_patient(
//!         &admin,
//!         NewPatient {
//!             user: UserId(2),
//!             first_name: "Maya".into(),
//!             last_name: "Lindqvist".into(),
//!             date_of_birth: "1991-05-04".into(),
//!             contact_number: "555-0188".into(),
//!             email: "maya@example.com".into(),
//!             address: "12 Harbour Road".into(),
//!             medical_history: String::new(),
//!         },
//!     )
//!     .await?;
//!
//! // The patient sees exactly their own row, regardless of table size.
//! let patient = Authn::from(Principal::patient(UserId(2), profile.id));
//! let visible = clinic.list_patients(&patient).await?;
//! assert_eq!(visible.len(), 1);
//! assert_eq!(visible[0].id, profile.id);
//! # Ok(())
//! # }
//! ```

pub mod authz;
pub mod error;
pub mod principal;
pub mod records;
pub mod service;
pub mod store;

// Re-export main types
pub use authz::{Action, Decision, ResourceKind, ScopeFilter};
pub use error::{ClinicError, Result};
pub use principal::{Authn, DoctorId, PatientId, Principal, UserId};
pub use service::ClinicService;
pub use store::{ClinicStore, MemoryStore};
