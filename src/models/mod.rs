pub mod appointment;
pub mod case;
pub mod client;
pub mod event;
pub mod hearing;
pub mod user;

pub use appointment::{Appointment, AppointmentCreate, AppointmentStatus, AppointmentUpdate};
pub use case::{Case, CaseCreate, CasePriority, CaseStatus, CaseUpdate};
pub use client::{Client, ClientCreate, ClientUpdate};
pub use event::{Event, EventCreate, EventUpdate};
pub use hearing::{Hearing, HearingCreate, HearingStatus, HearingUpdate};
pub use user::{User, UserResponse};
