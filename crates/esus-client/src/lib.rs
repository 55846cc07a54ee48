//! Client for the e-SUS PEC scheduling GraphQL API.
//!
//! The service authorizes every call against the session's *active scope*
//! ("lotação"), a professional's binding to one health unit. This crate keeps
//! one authenticated session, learns which scope serves which health unit,
//! and switches scope on request so citizen, professional, schedule, and
//! appointment operations run in the right unit.
//!
//! # Overview
//!
//! - [`SessionContextManager`]: login, access map, scope switching, and the
//!   scope-dependent queries and mutations
//! - [`GraphQLTransport`]: the HTTP envelope and session headers
//! - [`workflow::book`]: the full citizen-to-appointment flow
//!
//! # Example
//!
//! ```ignore
//! use esus_client::{ClientConfig, SessionContextManager};
//!
//! let config = ClientConfig::from_endpoint("https://pec.example.gov.br/api/graphql")?;
//! let mut manager = SessionContextManager::new(config);
//!
//! if manager.authenticate("12345678900", "secret").await && manager.build_access_map().await {
//!     let citizen = manager.find_subject_by_identifier("jose", false).await;
//! }
//! ```

pub mod config;
pub mod error;
pub mod graphql;
pub mod manager;
pub mod models;
pub mod operations;
pub mod schedule;
pub mod session;
pub mod workflow;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use graphql::{GraphQLErrorItem, GraphQLRequest, GraphQLResponse, GraphQLTransport};
pub use manager::SessionContextManager;
pub use models::{
    AppointmentId, AppointmentSituation, Citizen, CitizenId, Contact, HealthUnit, HealthUnitId,
    Occupation, OccupationId, Professional, ProfessionalId, ProfessionalScope, ScheduleSlot,
    ScheduledAppointment, ScopeId,
};
pub use session::{AccessGrant, AccessMap, Session};
pub use workflow::{BookingError, BookingOptions, BookingOutcome, BookingPlan, BookingRequest, Choice};
