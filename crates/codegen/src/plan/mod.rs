//! # Plans
//!
//! The intermediate representation between the snapshot and the emitted
//! source. Repository plans carry every statement as data; controller plans
//! carry every route binding. Emitters only translate plans into tokens.

pub mod repository;
pub mod routes;
pub mod sql;

pub use repository::{DetailPlan, MasterDetailPlan, Operation, RepositoryPlan};
pub use routes::{ControllerPlan, HttpMethod, OperationKind, ROUTE_RULES, RouteBinding, RouteRule};
pub use sql::{Bind, SqlBuilder, Statement};
